use crate::core::calculator::threshold::HoursSummary;
use crate::core::context::Context;
use crate::db::log::{audit, object};
use crate::db::pool::DbPool;
use crate::db::queries::{load_entries_by_work_order, logged_hours};
use crate::db::work_orders::{
    delete_work_order, insert_work_order, load_work_order, set_approved, set_status,
};
use crate::errors::AppResult;
use crate::models::{NewWorkOrder, Priority, WorkOrder, WorkOrderStatus};
use crate::notify::settings::StatusChangeOptions;
use crate::notify::{Notice, deliver};
use rusqlite::Connection;
use tracing::info;

pub struct WorkOrderLogic;

impl WorkOrderLogic {
    pub fn create(pool: &mut DbPool, ctx: &Context, input: NewWorkOrder) -> AppResult<WorkOrder> {
        let tx = pool.conn.transaction()?;
        let id = insert_work_order(&tx, &input)?;
        audit(
            &tx,
            ctx.actor(),
            "create",
            object::WORK_ORDER,
            Some(id),
            &format!("{}: {}", input.job_number, input.description),
        )?;
        let wo = load_work_order(&tx, id)?;
        tx.commit()?;

        info!(work_order = id, job = %wo.job_number, "work order created");

        if let Some((recipients, opts)) = ctx.settings().new_work_order() {
            let wanted = match wo.priority {
                Priority::High => opts.high_priority,
                Priority::Medium => opts.medium_priority,
                Priority::Low => opts.low_priority,
            };
            if wanted {
                let notice = Notice::NewWorkOrder {
                    work_order_id: wo.id,
                    job_number: wo.job_number.clone(),
                    priority: wo.priority,
                    recipients: recipients.to_vec(),
                };
                deliver(&pool.conn, ctx.notifier, ctx.actor(), &notice);
            }
        }

        Ok(wo)
    }

    pub fn set_status(
        pool: &mut DbPool,
        ctx: &Context,
        id: i64,
        status: WorkOrderStatus,
    ) -> AppResult<WorkOrder> {
        let tx = pool.conn.transaction()?;
        let before = load_work_order(&tx, id)?;
        if before.status == status {
            return Ok(before);
        }

        set_status(&tx, id, status)?;
        audit(
            &tx,
            ctx.actor(),
            "status",
            object::WORK_ORDER,
            Some(id),
            &format!("{} -> {}", before.status.to_db_str(), status.to_db_str()),
        )?;
        tx.commit()?;

        if let Some((recipients, opts)) = ctx.settings().status_change()
            && status_change_wanted(opts, before.status, status)
        {
            let notice = Notice::StatusChange {
                work_order_id: id,
                job_number: before.job_number.clone(),
                from: before.status,
                to: status,
                recipients: recipients.to_vec(),
            };
            deliver(&pool.conn, ctx.notifier, ctx.actor(), &notice);
        }

        Ok(WorkOrder { status, ..before })
    }

    pub fn approve(pool: &mut DbPool, ctx: &Context, id: i64, approved: bool) -> AppResult<()> {
        let tx = pool.conn.transaction()?;
        set_approved(&tx, id, approved)?;
        audit(
            &tx,
            ctx.actor(),
            "approve",
            object::WORK_ORDER,
            Some(id),
            if approved { "approved for work" } else { "approval withdrawn" },
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a work order with its entries and projects.
    pub fn delete(pool: &mut DbPool, ctx: &Context, id: i64) -> AppResult<usize> {
        let tx = pool.conn.transaction()?;
        let wo = load_work_order(&tx, id)?;
        let entries = load_entries_by_work_order(&tx, id)?.len();
        delete_work_order(&tx, id)?;
        audit(
            &tx,
            ctx.actor(),
            "delete",
            object::WORK_ORDER,
            Some(id),
            &format!("{} ({} entries removed)", wo.job_number, entries),
        )?;
        tx.commit()?;
        Ok(entries)
    }

    pub fn summary(conn: &Connection, id: i64) -> AppResult<(WorkOrder, HoursSummary)> {
        let wo = load_work_order(conn, id)?;
        let summary = HoursSummary::new(wo.estimated_hours, logged_hours(conn, id)?);
        Ok((wo, summary))
    }
}

fn status_change_wanted(opts: &StatusChangeOptions, from: WorkOrderStatus, to: WorkOrderStatus) -> bool {
    use WorkOrderStatus::*;
    match (from, to) {
        (Open, Complete) => opts.open_to_complete,
        (Complete, Closed) => opts.complete_to_closed,
        (_, Open) => opts.any_to_open,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::add::AddLogic;
    use crate::core::context::testing::*;
    use crate::db::queries::load_all_entries;
    use crate::notify::settings::{NewWorkOrderOptions, NotificationSetting};
    use crate::notify::testing::MemoryNotifier;

    fn input(job: &str, priority: Priority) -> NewWorkOrder {
        NewWorkOrder {
            customer_work_order_number: Some("C-77".into()),
            job_number: job.into(),
            description: "Boiler service".into(),
            owner: None,
            estimated_hours: 10.0,
            priority,
            location: Some("Site B".into()),
            scheduled_date: None,
            classification: "Billable".into(),
        }
    }

    #[test]
    fn new_work_order_notice_follows_priority_options() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let settings = vec![NotificationSetting::NewWorkOrder {
            enabled: true,
            recipients: vec!["ops@example.com".into()],
            options: NewWorkOrderOptions::default(),
        }];
        let ctx = ctx(&n, &settings);

        WorkOrderLogic::create(&mut pool, &ctx, input("J-1", Priority::High)).unwrap();
        WorkOrderLogic::create(&mut pool, &ctx, input("J-2", Priority::Low)).unwrap();

        let sent = n.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind(), "new_work_order");
    }

    #[test]
    fn status_change_notice_only_for_enabled_transitions() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let settings = vec![NotificationSetting::StatusChange {
            enabled: true,
            recipients: vec![],
            options: StatusChangeOptions::default(),
        }];
        let ctx = ctx(&n, &settings);
        let wo = WorkOrderLogic::create(&mut pool, &ctx, input("J-1", Priority::Medium))
            .unwrap()
            .id;

        WorkOrderLogic::set_status(&mut pool, &ctx, wo, WorkOrderStatus::Complete).unwrap();
        WorkOrderLogic::set_status(&mut pool, &ctx, wo, WorkOrderStatus::Open).unwrap();
        let updated =
            WorkOrderLogic::set_status(&mut pool, &ctx, wo, WorkOrderStatus::Closed).unwrap();
        assert_eq!(updated.status, WorkOrderStatus::Closed);

        // Open→Complete only; Complete→Open and Open→Closed are not enabled
        assert_eq!(n.sent.borrow().len(), 1);
    }

    #[test]
    fn delete_cascades_entries() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);
        AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0))).unwrap();

        assert_eq!(WorkOrderLogic::delete(&mut pool, &ctx, wo).unwrap(), 1);
        assert!(load_all_entries(&pool.conn).unwrap().is_empty());
    }

    #[test]
    fn summary_rolls_up_entries() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 8.0);
        AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0))).unwrap();

        let (_, s) = WorkOrderLogic::summary(&pool.conn, wo).unwrap();
        assert_eq!(s.logged, 2.0);
        assert_eq!(s.remaining, 6.0);
        assert_eq!(s.percentage, 25.0);
    }
}
