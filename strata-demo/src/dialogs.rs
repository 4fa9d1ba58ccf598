//! Dialogs used by the demo.

use std::time::Duration;

use log::{debug, info};
use strata::{Args, Dialog, DialogHandle, TipData};
use tokio::task::JoinHandle;

/// Settings dialog that plays preview audio while open.
#[derive(Default)]
pub struct AudioSettings {
    preview: Option<JoinHandle<()>>,
}

impl Dialog for AudioSettings {
    fn open(&mut self, dialog: &DialogHandle, args: &Args) {
        let section = args.get::<String>(0).unwrap_or_else(|| "general".to_string());
        info!("Settings opened on '{}' ({})", section, dialog.node());

        self.preview = Some(tokio::spawn(async {
            let mut beat = tokio::time::interval(Duration::from_millis(250));
            loop {
                beat.tick().await;
                debug!("Preview beat");
            }
        }));
    }

    fn on_close(&mut self, _args: &Args) {
        if let Some(preview) = self.preview.take() {
            preview.abort();
            info!("Preview audio stopped");
        }
    }

    fn open_clip(&self) -> Option<&str> {
        Some("slide_in")
    }

    fn close_clip(&self) -> Option<&str> {
        Some("slide_out")
    }
}

/// Yes/no prompt. The question is the first argument.
#[derive(Default)]
pub struct Confirm {
    question: String,
}

impl Dialog for Confirm {
    fn open(&mut self, _dialog: &DialogHandle, args: &Args) {
        self.question = args.get::<String>(0).unwrap_or_default();
        info!("Asking: {}", self.question);
    }

    fn on_close(&mut self, args: &Args) {
        let answer = args.get::<bool>(0).unwrap_or(false);
        info!("'{}' answered {}", self.question, if answer { "yes" } else { "no" });
        if !answer {
            return;
        }
        if let Some(layers) = strata::global::current() {
            tokio::spawn(async move {
                let _ = layers.show_tip(TipData::new("Confirmed").unique()).await;
            });
        }
    }
}
