// Outbox notifier — appends admin mail to a spool file.
//
// A local MTA or pickup agent is expected to drain the file. Each message is
// a minimal RFC 5322 message terminated by a blank line.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use super::traits::{Notice, Notifier};
use crate::logs::AppendLog;

pub struct OutboxNotifier {
    recipient: String,
    outbox: AppendLog,
}

impl OutboxNotifier {
    pub fn new(recipient: String, outbox: AppendLog) -> Self {
        Self { recipient, outbox }
    }

    fn render(&self, notice: &Notice) -> String {
        format!(
            "To: {}\nSubject: {}\nDate: {}\n\n{}\n\n",
            self.recipient,
            notice.subject(),
            Utc::now().to_rfc2822(),
            notice.body()
        )
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(&self, notice: &Notice) -> Result<()> {
        self.outbox.append(&self.render(notice)).await
    }
}
