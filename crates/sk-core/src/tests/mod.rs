mod models;
mod protocol;
