use super::*;

#[test]
fn evicts_oldest_first_past_capacity() {
    let mut log = ConversationLog::new(2);
    log.push(Role::User, "one", 1);
    log.push(Role::Assistant, "two", 2);
    log.push(Role::User, "three", 3);

    let entries: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(entries, vec!["two", "three"]);
}

#[test]
fn tail_is_a_projection_not_a_mutation() {
    let mut log = ConversationLog::new(10);
    for i in 0..5 {
        log.push(Role::User, format!("msg{i}"), i);
    }
    let projected = log.tail(2);
    assert_eq!(projected.len(), 2);
    assert_eq!(log.len(), 5, "tail() must not mutate the log");
}

#[test]
fn tail_fitting_drops_oldest_until_under_budget() {
    let mut log = ConversationLog::new(10);
    log.push(Role::User, "aaaaa", 1);
    log.push(Role::Assistant, "bbbbb", 2);
    log.push(Role::User, "ccccc", 3);

    let (projection, truncated) = log.tail_fitting(7);
    assert!(truncated);
    assert_eq!(projection.len(), 1);
    assert_eq!(projection[0].text, "ccccc");
    assert_eq!(log.len(), 3, "fitting a tail must not mutate the log");
}

#[test]
fn tail_fitting_reports_no_truncation_when_it_all_fits() {
    let mut log = ConversationLog::new(10);
    log.push(Role::User, "hi", 1);
    let (projection, truncated) = log.tail_fitting(1000);
    assert!(!truncated);
    assert_eq!(projection.len(), 1);
}
