//! AT command set and response parsing.

use chrono::NaiveDateTime;

/// Final result codes that end a command response.
pub const TERMINATORS: &[&[u8]] = &[b"OK\r\n", b"ERROR\r\n"];

pub const OK: &str = "OK\r\n";

/// Ends the SMS body after `AT+CMGS`.
pub const CTRL_Z: u8 = 0x1A;

/// Commands that put the modem into SMS text mode and save the result as
/// the power-on profile, so a plain reopen of the port is enough afterwards.
pub const PROVISIONING: [&str; 7] = [
    // echo off
    "ATE0",
    "AT+CSCS=\"GSM\"",
    // text mode SMS
    "AT+CMGF=1",
    "AT+CPMS=\"ME\",\"ME\",\"ME\"",
    "AT&W1",
    "AT&P1",
    // delete read and sent messages
    "AT+CMGD=1,2",
];

pub const ATTENTION: &str = "AT";
pub const LIST_UNREAD: &str = "AT+CMGL=\"REC UNREAD\"";
pub const CLOCK: &str = "AT+CCLK?";
pub const REBOOT: &str = "AT#REBOOT";

pub fn send_sms_header(recipient: &str) -> String {
    format!("AT+CMGS=\"{recipient}\"")
}

pub fn is_ok(reply: &str) -> bool {
    reply.ends_with(OK)
}

/// One unread message from `AT+CMGL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundSms {
    pub index: u32,
    pub sender: String,
    /// Service centre timestamp as sent, e.g. `24/03/05,14:22:10-20`.
    pub received: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreadSms {
    /// The modem answered with a bare `OK`.
    Empty,
    Messages(Vec<InboundSms>),
    /// The modem answered `OK` but the listing could not be parsed.
    Malformed,
    /// The command itself failed.
    Failed,
}

/// Split a header on commas that are outside double quotes, unquoting.
fn quoted_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_header(header: &str) -> Option<(u32, String, String)> {
    let fields = quoted_fields(header);
    let index = fields.first()?.trim().parse().ok()?;
    let sender = fields.get(2)?.trim().to_string();
    if sender.is_empty() {
        return None;
    }
    let received = fields.get(4).map(|f| f.trim().to_string()).unwrap_or_default();
    Some((index, sender, received))
}

/// Parse an `AT+CMGL` response in text mode:
///
/// ```text
/// +CMGL: 1,"REC UNREAD","9990001212","","24/03/05,14:22:10-20"
/// Status?
/// OK
/// ```
pub fn parse_unread(reply: &str) -> UnreadSms {
    if reply.trim() == "OK" {
        return UnreadSms::Empty;
    }

    let mut messages: Vec<InboundSms> = Vec::new();
    for line in reply.lines().map(str::trim) {
        if line.is_empty() || line == "OK" {
            continue;
        }
        if let Some(header) = line.strip_prefix("+CMGL:") {
            let Some((index, sender, received)) = parse_header(header) else {
                return UnreadSms::Malformed;
            };
            messages.push(InboundSms {
                index,
                sender,
                received,
                body: String::new(),
            });
        } else if let Some(current) = messages.last_mut() {
            if !current.body.is_empty() {
                current.body.push(' ');
            }
            current.body.push_str(line);
        } else {
            return UnreadSms::Malformed;
        }
    }

    if messages.is_empty() {
        UnreadSms::Malformed
    } else {
        UnreadSms::Messages(messages)
    }
}

/// Parse the network clock from an `AT+CCLK?` response. The quarter-hour
/// zone suffix (and DST flag) is dropped; the result is local time.
///
/// `+CCLK: "24/03/05,14:22:10-20"` → 2024-03-05 14:22:10
pub fn parse_clock(reply: &str) -> Option<NaiveDateTime> {
    let start = reply.find('"')? + 1;
    let end = start + reply[start..].find('"')?;
    let stamp = &reply[start..end];
    let (date, time) = stamp.split_once(',')?;
    let zone_at = time.find(['+', '-']).unwrap_or(time.len());
    NaiveDateTime::parse_from_str(&format!("{date},{}", &time[..zone_at]), "%y/%m/%d,%H:%M:%S")
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn bare_ok_is_empty() {
        assert_eq!(parse_unread("\r\nOK\r\n"), UnreadSms::Empty);
    }

    #[test]
    fn parses_two_messages() {
        let reply = "\r\n+CMGL: 1,\"REC UNREAD\",\"9990001212\",\"\",\"24/03/05,14:22:10-20\"\r\n\
Arm partition 1 away\r\n\
+CMGL: 2,\"REC UNREAD\",\"+16135550000\",\"\",\"24/03/05,14:25:00-20\"\r\nStatus?\r\n\r\nOK\r\n";
        let UnreadSms::Messages(msgs) = parse_unread(reply) else {
            panic!("expected messages");
        };
        assert_eq!(msgs.len(), 2);
        assert_eq!(
            msgs[0],
            InboundSms {
                index: 1,
                sender: "9990001212".into(),
                received: "24/03/05,14:22:10-20".into(),
                body: "Arm partition 1 away".into(),
            }
        );
        assert_eq!(msgs[1].sender, "+16135550000");
        assert_eq!(msgs[1].body, "Status?");
    }

    #[test]
    fn multi_line_body_is_joined() {
        let reply = "+CMGL: 3,\"REC UNREAD\",\"555\",\"\",\"24/01/01,00:00:00+00\"\r\narm\r\nstay\r\nOK\r\n";
        let UnreadSms::Messages(msgs) = parse_unread(reply) else {
            panic!("expected messages");
        };
        assert_eq!(msgs[0].body, "arm stay");
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(parse_unread("hello\r\nOK\r\n"), UnreadSms::Malformed);
        assert_eq!(
            parse_unread("+CMGL: x,\"REC UNREAD\"\r\nOK\r\n"),
            UnreadSms::Malformed
        );
    }

    #[test]
    fn clock_with_and_without_dst() {
        let t = parse_clock("\r\n+CCLK: \"24/03/05,14:22:10-20\"\r\n\r\nOK\r\n").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 5));
        assert_eq!((t.hour(), t.minute(), t.second()), (14, 22, 10));

        let t = parse_clock("+CCLK: \"23/12/31,23:59:59+04,1\"\r\nOK\r\n").unwrap();
        assert_eq!((t.year(), t.hour()), (2023, 23));
    }

    #[test]
    fn clock_unquoted_is_none() {
        assert!(parse_clock("+CCLK: 24/03/05\r\nOK\r\n").is_none());
    }

    #[test]
    fn provisioning_order() {
        assert_eq!(PROVISIONING.first(), Some(&"ATE0"));
        assert_eq!(PROVISIONING.last(), Some(&"AT+CMGD=1,2"));
        assert_eq!(send_sms_header("+15551234"), "AT+CMGS=\"+15551234\"");
    }
}
