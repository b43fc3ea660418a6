pub mod errors;
pub mod db;
pub mod reservation;

#[cfg(test)]
mod tests;
