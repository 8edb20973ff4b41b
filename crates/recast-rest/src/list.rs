//! Timer list serialization in the supported output formats.
//!
//! One [`TimerListFormat`] instance lives for one listing request. The
//! handler feeds every stored timer in order; pagination and the
//! emitted/total counters are shared [`ListWindow`] state, the document
//! shape is per-format.

use recast_common::Result;
use recast_store::{Channel, Timer};
use serde::Serialize;

use crate::values;

/// Flat projection of a live timer for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct SerTimer {
    pub id: String,
    pub start: i32,
    pub stop: i32,
    pub priority: i32,
    pub lifetime: i32,
    pub event_id: i64,
    pub weekdays: String,
    pub day: String,
    pub channel: u32,
    pub filename: String,
    pub channelname: String,
    pub is_pending: bool,
    pub is_recording: bool,
    pub is_active: bool,
}

impl SerTimer {
    fn project(timer: &Timer, channel: &Channel, id: usize) -> Self {
        Self {
            id: id.to_string(),
            start: timer.start,
            stop: timer.stop,
            priority: timer.priority,
            lifetime: timer.lifetime,
            event_id: timer.event_id.unwrap_or(-1),
            weekdays: values::weekdays_to_str(timer.weekdays),
            day: values::day_from_epoch(timer.day),
            channel: channel.number,
            filename: timer.file.clone(),
            channelname: channel.name.clone(),
            is_pending: timer.pending,
            is_recording: timer.recording,
            is_active: timer.is_active(),
        }
    }
}

/// Pagination and counting state shared by all list formats.
#[derive(Debug, Default)]
pub struct ListWindow {
    start: usize,
    limit: usize,
    active: bool,
    seen: usize,
    emitted: usize,
    total: usize,
}

impl ListWindow {
    pub fn activate(&mut self, start: usize, limit: usize) {
        self.start = start;
        self.limit = limit;
        self.active = true;
    }

    /// Account for the next record in store order; true if it is emitted.
    pub fn admit(&mut self) -> bool {
        let index = self.seen;
        self.seen += 1;
        if self.active && (index < self.start || index >= self.start + self.limit) {
            return false;
        }
        self.emitted += 1;
        true
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Format-polymorphic timer listing.
///
/// Call order: `activate_limit` (optional), `init`, `add_timer` once per
/// stored entity in store order, `set_total`, `finish`.
pub trait TimerListFormat: Send {
    fn init(&mut self);
    fn activate_limit(&mut self, start: usize, limit: usize);
    fn add_timer(&mut self, timer: &Timer, channel: &Channel, id: usize);
    fn set_total(&mut self, total: usize);
    fn finish(&mut self) -> Result<String>;
}

/// Formatter and content type for a listing extension, if supported.
pub fn for_extension(extension: &str) -> Option<(Box<dyn TimerListFormat>, &'static str)> {
    match extension {
        ".json" => Some((
            Box::new(JsonTimerList::new()),
            "application/json; charset=utf-8",
        )),
        ".html" => Some((Box::new(HtmlTimerList::new()), "text/html; charset=utf-8")),
        ".xml" => Some((Box::new(XmlTimerList::new()), "text/xml; charset=utf-8")),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct TimerListEnvelope {
    timers: Vec<SerTimer>,
    count: usize,
    total: usize,
}

/// JSON listing; records accumulate until the envelope is serialized.
#[derive(Debug, Default)]
pub struct JsonTimerList {
    window: ListWindow,
    timers: Vec<SerTimer>,
}

impl JsonTimerList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerListFormat for JsonTimerList {
    fn init(&mut self) {}

    fn activate_limit(&mut self, start: usize, limit: usize) {
        self.window.activate(start, limit);
    }

    fn add_timer(&mut self, timer: &Timer, channel: &Channel, id: usize) {
        if !self.window.admit() {
            return;
        }
        self.timers.push(SerTimer::project(timer, channel, id));
    }

    fn set_total(&mut self, total: usize) {
        self.window.set_total(total);
    }

    fn finish(&mut self) -> Result<String> {
        let envelope = TimerListEnvelope {
            timers: std::mem::take(&mut self.timers),
            count: self.window.emitted(),
            total: self.window.total(),
        };
        Ok(serde_json::to_string(&envelope)?)
    }
}

/// XML listing; `<timer>` blocks accumulate, count/total close the document.
#[derive(Debug, Default)]
pub struct XmlTimerList {
    window: ListWindow,
    body: String,
}

impl XmlTimerList {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, name: &str, value: impl std::fmt::Display) {
        self.body
            .push_str(&format!("  <param name=\"{name}\">{value}</param>\n"));
    }
}

impl TimerListFormat for XmlTimerList {
    fn init(&mut self) {
        self.body
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.body.push_str("<timers xmlns=\"urn:recast:timers\">\n");
    }

    fn activate_limit(&mut self, start: usize, limit: usize) {
        self.window.activate(start, limit);
    }

    fn add_timer(&mut self, timer: &Timer, channel: &Channel, id: usize) {
        if !self.window.admit() {
            return;
        }
        let t = SerTimer::project(timer, channel, id);
        self.body.push_str(" <timer>\n");
        self.push_param("id", &t.id);
        self.push_param("start", t.start);
        self.push_param("stop", t.stop);
        self.push_param("priority", t.priority);
        self.push_param("lifetime", t.lifetime);
        self.push_param("event_id", t.event_id);
        self.push_param("weekdays", escape_xml(&t.weekdays));
        self.push_param("day", escape_xml(&t.day));
        self.push_param("channel", t.channel);
        self.push_param("is_recording", t.is_recording);
        self.push_param("is_pending", t.is_pending);
        self.push_param("filename", escape_xml(&t.filename));
        self.push_param("channelname", escape_xml(&t.channelname));
        self.push_param("is_active", t.is_active);
        self.body.push_str(" </timer>\n");
    }

    fn set_total(&mut self, total: usize) {
        self.window.set_total(total);
    }

    fn finish(&mut self) -> Result<String> {
        self.body.push_str(&format!(
            " <count>{}</count><total>{}</total>",
            self.window.emitted(),
            self.window.total()
        ));
        self.body.push_str("</timers>");
        Ok(std::mem::take(&mut self.body))
    }
}

/// Minimal HTML listing of filenames, diagnostic quality.
#[derive(Debug, Default)]
pub struct HtmlTimerList {
    window: ListWindow,
    body: String,
}

impl HtmlTimerList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerListFormat for HtmlTimerList {
    fn init(&mut self) {
        self.body.push_str(
            "<!DOCTYPE html>\n<html><head><title>Timers</title></head><body>",
        );
        self.body.push_str("<ul>");
    }

    fn activate_limit(&mut self, start: usize, limit: usize) {
        self.window.activate(start, limit);
    }

    fn add_timer(&mut self, timer: &Timer, _channel: &Channel, _id: usize) {
        if !self.window.admit() {
            return;
        }
        self.body.push_str("<li>");
        self.body.push_str(&escape_xml(&timer.file));
        self.body.push('\n');
    }

    fn set_total(&mut self, total: usize) {
        self.window.set_total(total);
    }

    fn finish(&mut self) -> Result<String> {
        self.body.push_str("</ul>");
        self.body.push_str("</body></html>");
        Ok(std::mem::take(&mut self.body))
    }
}

/// Escape the five XML-reserved characters.
fn escape_xml(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_timer(start: i32) -> Timer {
        Timer::parse(&format!("1:C1-1-1:@2024-03-05:{start}:2100:50:99:News & Sport:")).unwrap()
    }

    fn sample_channel() -> Channel {
        Channel {
            id: "C1-1-1".to_string(),
            number: 7,
            name: "Seven <HD>".to_string(),
        }
    }

    fn feed(format: &mut dyn TimerListFormat, n: usize) {
        format.init();
        let channel = sample_channel();
        for i in 0..n {
            format.add_timer(&sample_timer(2000 + i as i32), &channel, i);
        }
        format.set_total(n);
    }

    #[test]
    fn json_envelope_counts_and_projects() {
        let mut format = JsonTimerList::new();
        feed(&mut format, 2);
        let body = format.finish().unwrap();
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(v["count"], 2);
        assert_eq!(v["total"], 2);
        assert_eq!(v["timers"][0]["id"], "0");
        assert_eq!(v["timers"][0]["start"], 2000);
        assert_eq!(v["timers"][0]["day"], "2024-03-05");
        assert_eq!(v["timers"][0]["weekdays"], "-------");
        assert_eq!(v["timers"][0]["channel"], 7);
        assert_eq!(v["timers"][0]["channelname"], "Seven <HD>");
        assert_eq!(v["timers"][0]["event_id"], -1);
        assert_eq!(v["timers"][0]["is_active"], true);
        assert_eq!(v["timers"][1]["start"], 2001);
    }

    #[test]
    fn window_skips_but_counts_everything() {
        let mut format = JsonTimerList::new();
        format.activate_limit(2, 1);
        feed(&mut format, 5);
        let body = format.finish().unwrap();
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(v["count"], 1);
        assert_eq!(v["total"], 5);
        assert_eq!(v["timers"].as_array().unwrap().len(), 1);
        // the third record by store order
        assert_eq!(v["timers"][0]["start"], 2002);
        assert_eq!(v["timers"][0]["id"], "2");
    }

    #[test]
    fn xml_escapes_and_closes_with_counts() {
        let mut format = XmlTimerList::new();
        feed(&mut format, 1);
        let body = format.finish().unwrap();

        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(body.contains("<param name=\"filename\">News &amp; Sport</param>"));
        assert!(body.contains("<param name=\"channelname\">Seven &lt;HD&gt;</param>"));
        assert!(body.contains("<param name=\"is_active\">true</param>"));
        assert!(body.ends_with("<count>1</count><total>1</total></timers>"));
    }

    #[test]
    fn html_lists_filenames_only() {
        let mut format = HtmlTimerList::new();
        feed(&mut format, 2);
        let body = format.finish().unwrap();

        assert!(body.contains("<ul>"));
        assert!(body.contains("<li>News &amp; Sport"));
        assert!(body.ends_with("</ul></body></html>"));
    }

    #[test]
    fn unknown_extensions_have_no_formatter() {
        assert!(for_extension(".json").is_some());
        assert!(for_extension(".xml").is_some());
        assert!(for_extension(".html").is_some());
        assert!(for_extension(".csv").is_none());
        assert!(for_extension("").is_none());
    }
}
