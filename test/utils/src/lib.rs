pub fn test_feedback_fixture() -> &'static str {
    return r#"{"team":"team-1","test":"test1","text":"1 test passed","success":true,"submit":false}"#;
}

pub fn compile_feedback_fixture() -> &'static str {
    return r#"{"text":"Main.java:3: error: ';' expected\n    int x = 5\n             ^\n1 error","success":false}"#;
}

/// A CONNECTED frame as sent by a Spring broker relay.
pub fn connected_frame_fixture() -> &'static str {
    return "CONNECTED\nversion:1.2\nheart-beat:10000,10000\nuser-name:team-1\n\n\u{0}";
}

/// A MESSAGE frame on the time queue, acknowledged per message.
pub fn time_message_frame_fixture() -> &'static str {
    return "MESSAGE\ndestination:/queue/time\ncontent-type:application/json\nsubscription:sub-2\nmessage-id:a1b2-7\nack:a1b2-7\ncontent-length:37\n\n{\"remainingTime\":120,\"totalTime\":440}\u{0}";
}

pub fn snapshot_fixture() -> &'static str {
    return r#"
session:
  active_assignment_id: fizzbuzz
  running: true
paused: false
clock:
  remaining: 300
  total: 440
assignments:
  - id: fizzbuzz
    name: fizzbuzz
    total_time_seconds: 440
    remaining_time_seconds: 300
  - name: sudoku
    total_time_seconds: 600
  - name: parking-lot
    total_time_seconds: 900
    completed: true
tests:
  - test1
  - test2
"#
    .trim_start();
}
