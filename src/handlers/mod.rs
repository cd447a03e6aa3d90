pub mod crons;
pub mod geocode;
pub mod github;
pub mod location;
pub mod tracker;
