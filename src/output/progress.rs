use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::bright_yellow;

/// Spinner shown while a request to the server is in flight.
///
/// The spinner is cleared as soon as the request returns, so nothing is left
/// on screen when the verification prompt runs between attempts.
pub struct RequestSpinner {
    pb: ProgressBar,
}

impl RequestSpinner {
    pub fn start(url: &str) -> Self {
        let pb = create_spinner(bright_yellow(format!("Waiting for {url}")).to_string());
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
