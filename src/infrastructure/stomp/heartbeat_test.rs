use std::time::Duration;

use anyhow::Result;

use super::HeartBeat;

#[test]
fn it_renders_header_value() {
    assert_eq!(HeartBeat::new(4000, 4000).header_value(), "4000,4000");
}

#[test]
fn it_parses_header_value() -> Result<()> {
    let res = HeartBeat::parse("10000, 0")?;
    assert_eq!(res.outgoing, Duration::from_secs(10));
    assert!(res.incoming.is_zero());
    return Ok(());
}

#[test]
fn it_fails_on_malformed_value() {
    assert!(HeartBeat::parse("4000").is_err());
    assert!(HeartBeat::parse("a,b").is_err());
}

#[test]
fn it_negotiates_the_slower_interval() {
    let res = HeartBeat::new(4000, 4000).negotiate(&HeartBeat::new(10000, 2000));
    assert_eq!(res.outgoing, Duration::from_millis(4000));
    assert_eq!(res.incoming, Duration::from_millis(10000));
}

#[test]
fn it_disables_directions_either_side_refuses() {
    let res = HeartBeat::new(4000, 4000).negotiate(&HeartBeat::new(0, 5000));
    assert_eq!(res.outgoing, Duration::from_millis(5000));
    assert!(res.incoming.is_zero());
    assert_eq!(res.incoming_deadline(), None);
}

#[test]
fn it_tolerates_two_missed_beats() {
    let res = HeartBeat::new(4000, 4000);
    assert_eq!(res.incoming_deadline(), Some(Duration::from_secs(8)));
}
