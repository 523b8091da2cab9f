mod filters;
mod health;
mod isolation;
mod scanning;
