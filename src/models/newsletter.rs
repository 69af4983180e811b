use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};
use crate::error::FlockError;
use crate::models::status::{Lifecycle, Transitions};

text_enum! {
    pub enum NewsletterStatus ("newsletter status") {
        Draft => "draft", "Draft";
        Scheduled => "scheduled", "Scheduled";
        Sent => "sent", "Sent";
    }
}

impl Transitions for NewsletterStatus {
    const ENTITY: &'static str = "newsletter";

    fn next_states(&self) -> &'static [Self] {
        match self {
            NewsletterStatus::Draft => &[NewsletterStatus::Scheduled, NewsletterStatus::Sent],
            NewsletterStatus::Scheduled => &[NewsletterStatus::Sent, NewsletterStatus::Draft],
            NewsletterStatus::Sent => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Newsletter {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub status: NewsletterStatus,
    pub scheduled_for: Option<NaiveDate>,
    pub sent_at: Option<NaiveDateTime>,
    pub recipients: u32,
    pub open_rate: f64,
    pub click_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNewsletter {
    pub title: String,
    pub body: String,
}

impl Newsletter {
    pub fn provisional(draft: &NewNewsletter) -> Self {
        Self {
            id: 0,
            title: draft.title.clone(),
            body: draft.body.clone(),
            status: NewsletterStatus::Draft,
            scheduled_for: None,
            sent_at: None,
            recipients: 0,
            open_rate: 0.0,
            click_rate: 0.0,
        }
    }

    pub fn scheduled(&self, on: NaiveDate, now: NaiveDateTime) -> Result<Newsletter, FlockError> {
        if on < now.date() {
            return Err(FlockError::validation(
                "scheduled_for",
                "cannot schedule in the past",
            ));
        }
        let mut next = self.transitioned(NewsletterStatus::Scheduled, now)?;
        next.scheduled_for = Some(on);
        Ok(next)
    }

    pub fn sent(&self, recipients: u32, now: NaiveDateTime) -> Result<Newsletter, FlockError> {
        let mut next = self.transitioned(NewsletterStatus::Sent, now)?;
        next.recipients = recipients;
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsletterFacet {
    Status(NewsletterStatus),
}

impl Record for Newsletter {
    const ENTITY: &'static str = "newsletter";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Newsletter {
    type Facet = NewsletterFacet;

    fn haystacks(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.body.as_str()]
    }

    fn facets(&self) -> Vec<NewsletterFacet> {
        vec![NewsletterFacet::Status(self.status)]
    }
}

impl Sortable for Newsletter {
    fn sort_keys() -> &'static [&'static str] {
        &["title", "open rate"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Text(self.title.clone()),
            _ => SortValue::Number(self.open_rate),
        }
    }
}

impl Lifecycle for Newsletter {
    type Status = NewsletterStatus;

    fn status(&self) -> NewsletterStatus {
        self.status
    }

    fn set_status(&mut self, status: NewsletterStatus) {
        self.status = status;
    }

    fn entered(&mut self, status: NewsletterStatus, now: NaiveDateTime) {
        match status {
            NewsletterStatus::Draft => self.scheduled_for = None,
            NewsletterStatus::Scheduled => {
                if self.scheduled_for.is_none() {
                    self.scheduled_for = Some(now.date() + chrono::Duration::days(7));
                }
            }
            NewsletterStatus::Sent => self.sent_at = Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn draft() -> Newsletter {
        Newsletter::provisional(&NewNewsletter {
            title: "Easter Week".into(),
            body: "Services and times".into(),
        })
    }

    #[test]
    fn draft_to_scheduled_to_sent() {
        let on = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let scheduled = draft().scheduled(on, now()).unwrap();
        assert_eq!(scheduled.status, NewsletterStatus::Scheduled);
        assert_eq!(scheduled.scheduled_for, Some(on));

        let sent = scheduled.sent(120, now()).unwrap();
        assert_eq!(sent.status, NewsletterStatus::Sent);
        assert_eq!(sent.sent_at, Some(now()));
        assert_eq!(sent.recipients, 120);
    }

    #[test]
    fn sent_newsletter_cannot_be_sent_again() {
        let sent = draft().sent(10, now()).unwrap();
        let err = sent.sent(10, now()).unwrap_err();
        assert_eq!(
            err,
            FlockError::InvalidTransition {
                entity: "newsletter",
                from: "Sent".into(),
                to: "Sent".into(),
            }
        );
        assert!(sent.advanced(now()).is_err());
    }

    #[test]
    fn unscheduling_clears_the_date() {
        let on = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let back = draft()
            .scheduled(on, now())
            .unwrap()
            .transitioned(NewsletterStatus::Draft, now())
            .unwrap();
        assert_eq!(back.status, NewsletterStatus::Draft);
        assert_eq!(back.scheduled_for, None);
    }

    #[test]
    fn rejects_past_schedule() {
        let yesterday = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert!(matches!(
            draft().scheduled(yesterday, now()),
            Err(FlockError::Validation { .. })
        ));
    }
}
