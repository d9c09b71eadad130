//! Virtual-time arithmetic tests

#[cfg(test)]
mod tests {
    use crate::sched::vtime::{advance, effective, vt_before};
    use crate::time::{MICROSECS, MILLISECS};

    // =====================================================================
    // Accrual
    // =====================================================================

    #[test]
    fn no_elapsed_time_no_charge() {
        assert_eq!(advance(100, 5 * MILLISECS, 5 * MILLISECS), 100);
        // A clock that appears to run backwards must not refund time.
        assert_eq!(advance(100, 5 * MILLISECS, 4 * MILLISECS), 100);
    }

    #[test]
    fn whole_mcus_charge_exactly() {
        // 5ms at 100us per MCU is 50 units.
        assert_eq!(advance(0, 0, 5 * MILLISECS), 50);
        assert_eq!(advance(7, 10 * MILLISECS, 15 * MILLISECS), 57);
    }

    #[test]
    fn partial_mcu_rounds_up() {
        // 150us spans two MCUs; never under-charge.
        assert_eq!(advance(0, 0, 150 * MICROSECS), 2);
        // A single nanosecond still costs a whole MCU.
        assert_eq!(advance(0, 0, 1), 1);
    }

    #[test]
    fn accrual_wraps_at_u32_boundary() {
        assert_eq!(advance(u32::MAX, 0, 100 * MICROSECS), 0);
    }

    #[test]
    fn accrual_ignores_weight() {
        // mcu_advance is not a parameter: two domains of different
        // weight running the same wall time accrue the same avt.
        let a = advance(0, 0, 10 * MILLISECS);
        let b = advance(0, 0, 10 * MILLISECS);
        assert_eq!(a, b);
        assert_eq!(a, 100);
    }

    // =====================================================================
    // Effective virtual time
    // =====================================================================

    #[test]
    fn warped_domain_runs_in_the_past() {
        assert_eq!(effective(1000, true, 100), 900);
    }

    #[test]
    fn unwarped_evt_equals_avt() {
        assert_eq!(effective(1000, false, 100), 1000);
        assert_eq!(effective(0, false, 0), 0);
    }

    #[test]
    fn warp_subtraction_wraps() {
        assert_eq!(effective(50, true, 100), 50u32.wrapping_sub(100));
    }

    // =====================================================================
    // Wrap-aware ordering
    // =====================================================================

    #[test]
    fn ordering_is_wrap_aware() {
        assert!(vt_before(10, 20));
        assert!(!vt_before(20, 10));
        assert!(!vt_before(10, 10));
        // Near the wrap point, a small value is "after" a huge one.
        assert!(vt_before(0xffff_fff0, 0x10));
        assert!(!vt_before(0x10, 0xffff_fff0));
    }
}
