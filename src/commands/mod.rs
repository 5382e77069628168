mod handlers;

pub use handlers::dispatch;
