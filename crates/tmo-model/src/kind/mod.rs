mod runnable;
pub use runnable::RunnableType;

mod fixture;
pub use fixture::FixturePhase;
