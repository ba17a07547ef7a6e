mod cli;
mod commands;
mod infra;

use mood_stability::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
