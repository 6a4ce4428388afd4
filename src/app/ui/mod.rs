mod details;
mod filters;
mod legend;
mod panels;
