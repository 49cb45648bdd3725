mod birds;
mod health;

pub use birds::{
    create_bird_handler, create_form_handler, delete_bird_handler, fallback_handler,
    get_bird_handler, index_handler, list_birds_handler, search_birds_handler,
    update_bird_handler, update_form_handler,
};
pub use health::health_handler;
