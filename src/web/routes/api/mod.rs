pub mod signup;

pub use signup::{register, signup, SignupError, SignupOutcome};
