mod config;
mod expr;
mod spec;
