//! Expands enabled rules into one-shot scheduler records.
//!
//! Every pass re-resolves the live event of each watched clan. The first time an
//! instance is seen for a rule, one record per lead time is inserted in a single
//! transaction; the unique index on (rule, clan, instance, lead time) turns
//! concurrent passes from other workers into swallowed conflicts instead of
//! duplicate reminders.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::collections::{HashMap, HashSet};

use crate::{
    config::CatchUpPolicy,
    data::{
        reminder_rule::ReminderRuleRepository, rule_health::RuleHealthRepository,
        scheduler::SchedulerRepository,
    },
    error::AppError,
    model::{
        event::EventInstance,
        reminder::{ReminderKind, ReminderRule},
        scheduler::CreateSchedulerRecordParam,
    },
    service::event_window::EventWindowResolver,
};

/// Counters of one materialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    pub rules_scanned: usize,
    pub instances_seen: usize,
    /// Records inserted untriggered, waiting for dispatch
    pub records_created: usize,
    /// Records inserted already triggered by the catch-up policy
    pub records_skipped: usize,
    /// Instances skipped because another pass wrote them first
    pub conflicts: usize,
}

#[derive(Clone)]
pub struct TriggerMaterializer {
    db: DatabaseConnection,
    resolver: EventWindowResolver,
    catch_up: CatchUpPolicy,
}

impl TriggerMaterializer {
    pub fn new(
        db: DatabaseConnection,
        resolver: EventWindowResolver,
        catch_up: CatchUpPolicy,
    ) -> Self {
        Self {
            db,
            resolver,
            catch_up,
        }
    }

    /// Runs a full pass over every enabled rule
    ///
    /// Each distinct (clan, kind) is resolved once and shared by every rule watching
    /// it. Rules marked broken are skipped. A failure while materializing one rule is
    /// logged and does not stop the pass.
    ///
    /// # Returns
    /// - `Ok(MaterializeSummary)`: Pass counters
    /// - `Err(AppError)`: Rules or rule health could not be loaded
    pub async fn materialize_all(&self, now: DateTime<Utc>) -> Result<MaterializeSummary, AppError> {
        let rules = ReminderRuleRepository::new(&self.db).get_enabled().await?;
        let broken: HashSet<i32> = RuleHealthRepository::new(&self.db)
            .get_broken_rule_ids()
            .await?
            .into_iter()
            .collect();

        let mut summary = MaterializeSummary::default();
        let mut resolved: HashMap<(String, ReminderKind), Option<EventInstance>> = HashMap::new();

        for rule in rules.iter().filter(|r| !broken.contains(&r.id)) {
            summary.rules_scanned += 1;

            for clan_tag in &rule.clan_tags {
                let key = (clan_tag.clone(), rule.kind);
                let instance = match resolved.get(&key) {
                    Some(instance) => instance.clone(),
                    None => {
                        let instance = self.resolver.resolve(clan_tag, rule.kind, now).await;
                        if instance.is_some() {
                            summary.instances_seen += 1;
                        }
                        resolved.insert(key, instance.clone());
                        instance
                    }
                };

                let Some(instance) = instance else {
                    continue;
                };

                if let Err(e) = self
                    .materialize_instance(rule, &instance, now, &mut summary)
                    .await
                {
                    tracing::error!(
                        "Failed to materialize rule {} for clan {} ({}): {}",
                        rule.id,
                        clan_tag,
                        instance.instance_key,
                        e
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Materializes the current event of one clan for every rule watching it
    ///
    /// Called by the rule service when a rule is created or re-enabled, so events
    /// already running do not wait for the next periodic pass.
    pub async fn materialize_clan(
        &self,
        clan_tag: &str,
        kind: ReminderKind,
        now: DateTime<Utc>,
    ) -> Result<MaterializeSummary, AppError> {
        let mut summary = MaterializeSummary::default();

        let Some(instance) = self.resolver.resolve(clan_tag, kind, now).await else {
            return Ok(summary);
        };
        summary.instances_seen = 1;

        let broken: HashSet<i32> = RuleHealthRepository::new(&self.db)
            .get_broken_rule_ids()
            .await?
            .into_iter()
            .collect();
        let rules = ReminderRuleRepository::new(&self.db).get_enabled().await?;

        for rule in rules.iter().filter(|r| {
            r.kind == kind && !broken.contains(&r.id) && r.clan_tags.iter().any(|t| t == clan_tag)
        }) {
            summary.rules_scanned += 1;
            self.materialize_instance(rule, &instance, now, &mut summary)
                .await?;
        }

        Ok(summary)
    }

    async fn materialize_instance(
        &self,
        rule: &ReminderRule,
        instance: &EventInstance,
        now: DateTime<Utc>,
        summary: &mut MaterializeSummary,
    ) -> Result<(), AppError> {
        let repo = SchedulerRepository::new(&self.db);

        // Instances are written atomically; any record means all of them exist
        if repo
            .has_instance(rule.id, &instance.clan_tag, &instance.instance_key)
            .await?
        {
            return Ok(());
        }

        let plan = plan_records(rule, instance, now, self.catch_up);
        let Some(records) = repo.create_instance(plan).await? else {
            tracing::debug!(
                "Rule {} clan {} ({}) was materialized by another pass",
                rule.id,
                instance.clan_tag,
                instance.instance_key
            );
            summary.conflicts += 1;
            return Ok(());
        };

        for record in records {
            if record.skipped {
                tracing::debug!(
                    "Skipped past reminder {}m for rule {} clan {} ({})",
                    record.lead_time.num_minutes(),
                    rule.id,
                    instance.clan_tag,
                    instance.instance_key
                );
                summary.records_skipped += 1;
            } else {
                summary.records_created += 1;
            }
        }

        Ok(())
    }
}

/// Computes the records to insert for a rule's first sighting of an instance
///
/// Lead times are de-duplicated. Lead times whose fire time has already passed are
/// marked skipped; under [`CatchUpPolicy::Fire`] the past lead time closest to the
/// event end is left unskipped so the next dispatch tick delivers it.
pub fn plan_records(
    rule: &ReminderRule,
    instance: &EventInstance,
    now: DateTime<Utc>,
    policy: CatchUpPolicy,
) -> Vec<CreateSchedulerRecordParam> {
    let mut lead_times = rule.lead_times.clone();
    lead_times.sort();
    lead_times.dedup();

    let catch_up_lead = match policy {
        CatchUpPolicy::Skip => None,
        CatchUpPolicy::Fire => lead_times
            .iter()
            .copied()
            .find(|lead| instance.fire_at(*lead) < now),
    };

    lead_times
        .into_iter()
        .map(|lead_time| {
            let fire_at = instance.fire_at(lead_time);
            CreateSchedulerRecordParam {
                guild_id: rule.guild_id,
                rule_id: rule.id,
                clan_tag: instance.clan_tag.clone(),
                instance_key: instance.instance_key.clone(),
                kind: instance.kind,
                lead_time,
                end_time: instance.end_time,
                fire_at,
                skipped: fire_at < now && Some(lead_time) != catch_up_lead,
            }
        })
        .collect()
}
