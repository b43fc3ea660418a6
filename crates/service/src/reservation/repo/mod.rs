pub mod seaorm;

pub use seaorm::SeaOrmReservationRepository;
