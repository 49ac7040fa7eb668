mod fixture;
pub use fixture::FixtureDescription;

mod runnable;
pub use runnable::RunnableDescription;
