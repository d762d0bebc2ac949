/// Derives the snake_case term namespace from a hash-routed url.
///
/// `http://host/#/tcl/tof/lc-credit-limit-adjust-detail?id=1` becomes
/// `tcl_tof_lc_credit_limit_adjust_detail`. An empty string means no
/// namespace could be derived and the run must stop. Whitespace around the
/// url or the route path is ignored, since urls are pasted into a form.
pub fn extract_term_prefix(url: &str) -> String {
    let fragment = match url.trim().split_once('#') {
        Some((_, f)) => f,
        None => return String::new(),
    };

    let path = fragment.strip_prefix('/').unwrap_or(fragment);
    let path = match path.split_once('?') {
        Some((p, _)) => p,
        None => path,
    };

    path.trim().replace(['-', '/'], "_")
}
