//! Channel renaming rules and the job that applies them

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Duration, Local, TimeZone, Weekday};
use log::{debug, error, info};
use rand::Rng;
use serenity::http::Http;
use serenity::model::id::GuildId;
use std::sync::Arc;

/// Probability that the Monday n -> m swap actually runs
const NM_SWAP_CHANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameAction {
    Replace { from: &'static str, to: &'static str },
    /// Swap n/N for m/M, but only occasionally
    MaybeNToM,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameRule {
    pub weekday: Weekday,
    pub hour: u32,
    pub action: RenameAction,
}

pub const RULES: [RenameRule; 3] = [
    RenameRule {
        weekday: Weekday::Fri,
        hour: 16,
        action: RenameAction::Replace { from: "☕", to: "🍻" },
    },
    RenameRule {
        weekday: Weekday::Mon,
        hour: 1,
        action: RenameAction::Replace { from: "🍻", to: "☕" },
    },
    RenameRule {
        weekday: Weekday::Mon,
        hour: 1,
        action: RenameAction::MaybeNToM,
    },
];

/// The first `weekday` at `hour`:00 strictly after `now`
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, weekday: Weekday, hour: u32) -> DateTime<Tz> {
    let days_ahead = (7 + weekday.num_days_from_monday() - now.weekday().num_days_from_monday()) % 7;
    let mut date = now.date_naive() + Duration::days(i64::from(days_ahead));

    loop {
        let candidate = date
            .and_hms_opt(hour, 0, 0)
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest());
        match candidate {
            Some(at) if at > *now => return at,
            // Already passed this week, or skipped by a DST change
            _ => date += Duration::days(7),
        }
    }
}

/// The channel name with `from` replaced, or `None` if it doesn't contain `from`
pub fn rename(name: &str, from: &str, to: &str) -> Option<String> {
    name.contains(from).then(|| name.replace(from, to))
}

/// Long-running job applying [`RULES`] to every channel of one guild
pub struct ChannelNameScheduler {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl ChannelNameScheduler {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }

    pub async fn run(self) {
        info!(
            "🏷️ Channel name scheduler started for guild {}",
            self.guild_id
        );

        loop {
            let now = Local::now();
            let Some((at, due)) = Self::next_due(&now) else {
                return;
            };
            let wait = (at - now).to_std().unwrap_or_default();
            debug!("Next channel rename at {at} ({} rules)", due.len());
            tokio::time::sleep(wait).await;

            for rule in due {
                self.apply(rule.action).await;
            }
        }
    }

    /// Earliest upcoming time and every rule due at that time
    fn next_due(now: &DateTime<Local>) -> Option<(DateTime<Local>, Vec<RenameRule>)> {
        let at = RULES
            .iter()
            .map(|rule| next_occurrence(now, rule.weekday, rule.hour))
            .min()?;
        let due = RULES
            .iter()
            .filter(|rule| next_occurrence(now, rule.weekday, rule.hour) == at)
            .copied()
            .collect();
        Some((at, due))
    }

    async fn apply(&self, action: RenameAction) {
        match action {
            RenameAction::Replace { from, to } => match self.replace_all(from, to).await {
                Ok(()) => info!("Replaced {from:?} with {to:?} in channel names"),
                Err(e) => error!("Replacing {from:?} with {to:?} in channel names: {e}"),
            },
            RenameAction::MaybeNToM => {
                let lucky = rand::rng().random_bool(NM_SWAP_CHANCE);
                if !lucky {
                    return;
                }
                for (from, to) in [("n", "m"), ("N", "M")] {
                    if let Err(e) = self.replace_all(from, to).await {
                        error!("Replacing {from} with {to} in channel names: {e}");
                        return;
                    }
                }
                info!("Replaced n/N with m/M in channel names");
            }
        }
    }

    /// Rename every guild channel containing `from`. Keeps going past failures.
    async fn replace_all(&self, from: &str, to: &str) -> Result<()> {
        let channels = self.guild_id.channels(&self.http).await?;

        let mut failures = 0;
        for (channel_id, channel) in channels {
            let Some(new_name) = rename(&channel.name, from, to) else {
                continue;
            };
            if let Err(e) = channel_id.edit(&self.http, |c| c.name(&new_name)).await {
                error!(
                    "Failed to rename channel {:?} ({channel_id}) to {new_name:?}: {e}",
                    channel.name
                );
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!("{failures} channels could not be renamed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_next_occurrence_later_this_week() {
        // 2024-05-15 is a Wednesday
        let now = utc(2024, 5, 15, 10, 0);
        assert_eq!(next_occurrence(&now, Weekday::Fri, 16), utc(2024, 5, 17, 16, 0));
    }

    #[test]
    fn test_next_occurrence_wraps_to_next_week() {
        let now = utc(2024, 5, 15, 10, 0);
        assert_eq!(next_occurrence(&now, Weekday::Mon, 1), utc(2024, 5, 20, 1, 0));
    }

    #[test]
    fn test_next_occurrence_same_day() {
        let friday_morning = utc(2024, 5, 17, 9, 30);
        assert_eq!(
            next_occurrence(&friday_morning, Weekday::Fri, 16),
            utc(2024, 5, 17, 16, 0)
        );

        // Exactly at the hour counts as passed
        let friday_at_four = utc(2024, 5, 17, 16, 0);
        assert_eq!(
            next_occurrence(&friday_at_four, Weekday::Fri, 16),
            utc(2024, 5, 24, 16, 0)
        );
    }

    #[test]
    fn test_next_occurrence_local_time() {
        let now = Local::now();
        let next = next_occurrence(&now, Weekday::Mon, 1);
        assert!(next > now);
        assert!(next - now <= Duration::days(7) + Duration::hours(1));
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!(next.hour(), 1);
    }

    #[test]
    fn test_monday_rules_due_together() {
        // Sunday evening: the two Monday rules are next
        let sunday = Local.with_ymd_and_hms(2024, 5, 19, 20, 0, 0).unwrap();
        let (at, due) = ChannelNameScheduler::next_due(&sunday).unwrap();
        assert_eq!(at.weekday(), Weekday::Mon);
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|r| r.weekday == Weekday::Mon));
    }

    #[test]
    fn test_rename() {
        assert_eq!(rename("☕-lounge", "☕", "🍻"), Some("🍻-lounge".to_string()));
        assert_eq!(rename("general", "☕", "🍻"), None);
        assert_eq!(rename("fun-channel", "n", "m"), Some("fum-chammel".to_string()));
    }
}
