mod client;
mod helpers;
mod listener;
mod outbound;
mod state;
