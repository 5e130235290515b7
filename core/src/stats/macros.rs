//! Macros
//!
//! Every statistic lives in a thread local cell and has a report function that moves the thread's
//! value into the global `StatsAccumulator`. A module lists its report functions once with
//! `stat_register_fns!` and calls the generated `register_stats()` from its constructors.

/// Defines a thread local statistic cell and its report function. The report function hands the
/// cell's value to `$report` on the accumulator and leaves a default value behind.
#[doc(hidden)]
#[macro_export]
macro_rules! stat_thread_local {
    ($title: expr, $var: ident, $stats_func: ident, $ty: ty, $report: ident) => {
        thread_local! {
            pub(crate) static $var: std::cell::RefCell<$ty> =
                std::cell::RefCell::new(<$ty>::default());
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.take());
            accum.$report($title, val);
        }
    };
}

/// Counter summed over all threads.
///
/// * `$title`      - Name of the statistic; a `/` separates category and title, e.g.
///                   "Contribution pool/Tile splats".
/// * `$var`        - Thread local variable.
/// * `$stats_func` - Report function to pass to `stat_register_fns!`.
#[macro_export]
macro_rules! stat_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        $crate::stat_thread_local!($title, $var, $stats_func, i64, report_counter);
    };
}

/// Byte count summed over all threads and printed in kB/MiB.
///
/// * `$title`      - Name of the statistic, e.g. "Memory/Contribution buffers".
/// * `$var`        - Thread local variable.
/// * `$stats_func` - Report function to pass to `stat_register_fns!`.
#[macro_export]
macro_rules! stat_memory_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        $crate::stat_thread_local!($title, $var, $stats_func, u64, report_memory_counter);
    };
}

/// Integer distribution (average, minimum and maximum) over all threads.
///
/// * `$title`      - Name of the statistic.
/// * `$var`        - Thread local variable.
/// * `$stats_func` - Report function to pass to `stat_register_fns!`.
#[macro_export]
macro_rules! stat_int_distribution {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        $crate::stat_thread_local!(
            $title,
            $var,
            $stats_func,
            $crate::stats::StatsDistribution,
            report_int_distribution
        );
    };
}

/// Adds to a counter.
#[macro_export]
macro_rules! stat_inc {
    ($var: ident, $e: expr) => {
        $var.with(|v| *v.borrow_mut() += $e);
    };
}

/// Records a value of a distribution.
#[macro_export]
macro_rules! stat_dist {
    ($var: ident, $e: expr) => {
        $var.with(|v| v.borrow_mut().report($e));
    };
}

/// Generates `register_stats()` for a module, which adds the given report functions to the global
/// registrar the first time it is called.
///
/// * `$($stat_func: ident),+` - Report functions created by the `stat_*` macros.
#[macro_export]
macro_rules! stat_register_fns {
    ($($stat_func: ident),+ $(,)?) => {
        pub(crate) fn register_stats() {
            static REGISTERED: std::sync::Once = std::sync::Once::new();
            REGISTERED.call_once(|| {
                let mut registrar = $crate::stats::STATS_REGISTRAR.lock().unwrap();
                $(
                    registrar.register_stat_func($stat_func);
                )+
            });
        }
    };
}

/// Moves the calling thread's statistics into the global `StatsAccumulator`. Worker threads call
/// it before exiting; the render loop calls it once more on the calling thread.
#[macro_export]
macro_rules! report_stats {
    () => {{
        let mut accum = $crate::stats::stats_accumulator().lock().unwrap();
        $crate::stats::STATS_REGISTRAR
            .lock()
            .unwrap()
            .call_stat_funcs(&mut accum);
    }};
}

/// Prints the global `StatsAccumulator`.
#[macro_export]
macro_rules! print_stats {
    () => {{
        $crate::stats::stats_accumulator().lock().unwrap().print();
    }};
}
