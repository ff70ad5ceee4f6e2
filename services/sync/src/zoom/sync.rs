use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use campus_db::zoom::models::{Meeting, Participant};
use campus_db::zoom::repositories::ZoomRepository;

use super::client::{ZoomAccount, ZoomClient, ZoomClientError};
use super::models::{RawMeeting, RawParticipant};
use crate::connector::{Connector, SyncOutcome};
use crate::pacing::{FixedInterval, MEETING_DELAY, PAGE_DELAY};

const SOURCE_NAME: &str = "zoom";

fn raw_to_meeting(account: &ZoomAccount, raw: &RawMeeting) -> Meeting {
    Meeting {
        source_uuid: raw.uuid.clone(),
        account_name: account.name.clone(),
        host_email: Some(account.user_id.clone()),
        topic: raw.topic.clone(),
        start_time: raw.start_time,
        end_time: raw.end_time,
        duration_minutes: raw.duration,
        participant_count: raw.participants_count,
        synced_at: Utc::now(),
    }
}

/// Participants without a join time cannot form the natural key and
/// are skipped rather than written.
fn raw_to_participant(meeting_uuid: &str, raw: &RawParticipant) -> Option<Participant> {
    let join_time = raw.join_time?;
    Some(Participant {
        meeting_uuid: meeting_uuid.to_string(),
        email: raw.user_email.clone(),
        name: raw.name.clone(),
        join_time,
        leave_time: raw.leave_time,
        duration_seconds: raw.duration,
    })
}

pub struct ZoomSyncer<R> {
    client: ZoomClient,
    repo: R,
    windows: Vec<(NaiveDate, NaiveDate)>,
}

impl<R> ZoomSyncer<R>
where
    R: ZoomRepository,
{
    pub fn new(client: ZoomClient, repo: R, windows: Vec<(NaiveDate, NaiveDate)>) -> Self {
        Self {
            client,
            repo,
            windows,
        }
    }

    /// Walk one account: meetings first, then each meeting's
    /// participants. Transport errors propagate and abort the rest of
    /// this account's work; write errors stay per-record.
    async fn sync_account(
        &self,
        account: &ZoomAccount,
        token: &str,
        outcome: &mut SyncOutcome,
    ) -> Result<(), ZoomClientError> {
        let mut pages = FixedInterval::new(PAGE_DELAY);
        let mut meetings = FixedInterval::new(MEETING_DELAY);

        for (from, to) in &self.windows {
            let mut next = String::new();
            loop {
                pages.tick().await;
                let page = self
                    .client
                    .fetch_meetings_page(token, &account.user_id, *from, *to, &next)
                    .await?;
                outcome.fetched += page.meetings.len() as u64;

                for raw in &page.meetings {
                    meetings.tick().await;
                    self.sync_meeting(account, token, raw, outcome, &mut pages)
                        .await?;
                }

                next = page.next_page_token;
                if next.is_empty() {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn sync_meeting(
        &self,
        account: &ZoomAccount,
        token: &str,
        raw: &RawMeeting,
        outcome: &mut SyncOutcome,
        pages: &mut FixedInterval,
    ) -> Result<(), ZoomClientError> {
        let meeting = raw_to_meeting(account, raw);
        match self.repo.upsert_meeting(&meeting).await {
            Ok(write) => outcome.record_write(write),
            Err(e) => {
                tracing::warn!(uuid = %raw.uuid, error = %e, "failed to upsert meeting");
                outcome.record_failure(format!("meeting {}: {e}", raw.uuid));
            }
        }

        let mut next = String::new();
        loop {
            pages.tick().await;
            let page = self
                .client
                .fetch_participants_page(token, &raw.uuid, &next)
                .await?;
            outcome.fetched += page.participants.len() as u64;

            for participant in &page.participants {
                match raw_to_participant(&raw.uuid, participant) {
                    Some(p) => match self.repo.insert_participant(&p).await {
                        Ok(true) => outcome.inserted += 1,
                        // Re-polls of overlapping windows resend the same
                        // rows; a duplicate is expected, not a failure.
                        Ok(false) => outcome.skipped += 1,
                        Err(e) => {
                            tracing::warn!(
                                uuid = %raw.uuid,
                                email = %p.email,
                                error = %e,
                                "failed to insert participant"
                            );
                            outcome.record_failure(format!("participant {}: {e}", p.email));
                        }
                    },
                    None => {
                        tracing::debug!(uuid = %raw.uuid, "participant without join time, skipping");
                        outcome.skipped += 1;
                    }
                }
            }

            next = page.next_page_token;
            if next.is_empty() {
                break;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<R> Connector for ZoomSyncer<R>
where
    R: ZoomRepository,
{
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    async fn sync(&self) -> SyncOutcome {
        let mut outcome = SyncOutcome::new(SOURCE_NAME);

        for account in &self.client.config().accounts {
            tracing::info!(account = %account.name, "zoom account sync starting");

            // Tokens are short-lived and account-scoped; minted fresh
            // per account, never carried across.
            let token = match self.client.fetch_token(account).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(account = %account.name, error = %e, "zoom auth failed, skipping account");
                    outcome.mark_fatal(format!("{}: {e}", account.name));
                    continue;
                }
            };

            if let Err(e) = self.sync_account(account, &token, &mut outcome).await {
                tracing::error!(account = %account.name, error = %e, "zoom account sync aborted");
                outcome.mark_fatal(format!("{}: {e}", account.name));
            } else {
                tracing::info!(account = %account.name, "zoom account sync completed");
            }
        }

        outcome
    }
}
