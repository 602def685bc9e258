mod file;
mod parser;
mod settings;
mod store;
