use crate::commands::{with_pool, CommandResult};

pub fn run() -> CommandResult {
    // Connecting through the shared scaffold already applies pending
    // migrations; there is nothing left to do with the pool.
    match with_pool("migrate", |_pool| async { Ok(()) }) {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => failure,
    }
}
