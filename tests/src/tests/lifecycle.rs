//! Admission, removal, and migration tests

#[cfg(test)]
mod tests {
    use rusty_fork::rusty_fork_test;
    use serial_test::serial;

    use crate::config::MAX_CPUS;
    use crate::sched::{self, DomId, DomState, DEFAULT_CTX_ALLOW, DEFAULT_MCU_ADVANCE};
    use crate::tests::{fresh_cpu, fresh_dom, setup};
    use crate::time::MILLISECS;

    #[test]
    #[serial]
    fn admission_rejects_bad_requests() {
        let (_p, cpu, doms) = setup(1);

        assert!(sched::on_admit(doms[0], cpu).is_err()); // duplicate id
        assert!(sched::on_admit(DomId::idle(0), cpu).is_err()); // reserved range
        assert!(sched::on_admit(fresh_dom(), MAX_CPUS).is_err()); // no such cpu
    }

    #[test]
    #[serial]
    fn new_domains_start_blocked_at_the_queue_baseline() {
        sched::set_ctx_allow(DEFAULT_CTX_ALLOW).unwrap();
        let (p, cpu, doms) = setup(1);
        let a = doms[0];
        sched::wake(a);
        sched::do_schedule(cpu, 0);
        p.set_now(10 * MILLISECS);
        sched::do_schedule(cpu, 10 * MILLISECS); // svt now 100

        let b = fresh_dom();
        sched::on_admit(b, cpu).unwrap();

        let snap = sched::domain_snapshot(b).unwrap();
        assert_eq!(snap.state, DomState::Blocked);
        assert!(!snap.on_runqueue);
        assert_eq!(snap.mcu_advance, DEFAULT_MCU_ADVANCE);
        // Joins at the baseline rather than claiming time from zero.
        assert_eq!(snap.avt, 100);
        assert_eq!(snap.evt, 100);
    }

    #[test]
    #[serial]
    fn removing_a_blocked_domain_frees_its_slot() {
        let (_p, _cpu, doms) = setup(1);
        let a = doms[0];

        sched::on_remove(a).unwrap();
        assert!(sched::domain_snapshot(a).is_none());
        assert!(sched::on_remove(a).is_err()); // already gone
    }

    #[test]
    #[serial]
    fn blocked_domain_after_fold_back_is_removable() {
        sched::set_ctx_allow(DEFAULT_CTX_ALLOW).unwrap();
        let (p, cpu, doms) = setup(1);
        let a = doms[0];
        sched::wake(a);
        sched::do_schedule(cpu, 0);
        sched::sleep(a);
        p.set_now(MILLISECS);
        sched::do_schedule(cpu, MILLISECS); // fold-back cancels any timers

        sched::on_remove(a).unwrap();
    }

    #[test]
    #[serial]
    fn migration_rebases_on_the_next_wake() {
        sched::set_ctx_allow(DEFAULT_CTX_ALLOW).unwrap();
        let (p, cpu1, doms) = setup(1);
        let a = doms[0];
        sched::wake(a);
        sched::do_schedule(cpu1, 0);
        p.set_now(10 * MILLISECS);
        sched::do_schedule(cpu1, 10 * MILLISECS); // a at avt 100
        sched::sleep(a);
        p.set_now(11 * MILLISECS);
        sched::do_schedule(cpu1, 11 * MILLISECS);

        let cpu2 = fresh_cpu();
        sched::set_domain_cpu(a, cpu2).unwrap();
        sched::wake(a);

        // The new queue's svt is 0; the carried avt of 110 is discarded.
        let snap = sched::domain_snapshot(a).unwrap();
        assert_eq!(snap.cpu, cpu2);
        assert_eq!(snap.avt, 0);
        let q = sched::cpu_snapshot(cpu2);
        assert!(q.queue[..q.queue_len].contains(&a));
    }

    #[test]
    #[serial]
    fn active_domains_cannot_be_rehomed() {
        let (_p, cpu, doms) = setup(1);
        let a = doms[0];
        sched::wake(a);
        assert!(sched::set_domain_cpu(a, cpu).is_err()); // queued

        sched::do_schedule(cpu, 0);
        assert!(sched::set_domain_cpu(a, cpu).is_err()); // running
    }

    rusty_fork_test! {
        #[test]
        fn removing_a_queued_domain_is_fatal() {
            let (_p, _cpu, doms) = setup(1);
            sched::wake(doms[0]);

            let result = std::panic::catch_unwind(|| sched::on_remove(doms[0]));
            assert!(result.is_err());
        }

        #[test]
        fn removing_the_running_domain_is_fatal() {
            let (_p, cpu, doms) = setup(1);
            sched::wake(doms[0]);
            sched::do_schedule(cpu, 0);

            let result = std::panic::catch_unwind(|| sched::on_remove(doms[0]));
            assert!(result.is_err());
        }
    }
}
