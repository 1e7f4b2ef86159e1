//! Status page rendering
//!
//! The single HTML view served for every request: current local time,
//! the `/update` form pre-filled from the configuration, a timezone
//! selector covering every whole-hour UTC offset, and the on/off
//! buttons. Pure function of (config, time) into a heapless buffer.

use core::fmt::{self, Write};

use heapless::String;

use crate::clock::LocalTime;
use crate::config::{Config, TIMEZONE_MAX, TIMEZONE_MIN};

/// Rendered page upper bound. The fixed markup plus 27 timezone options
/// stays comfortably below this.
pub const PAGE_BUF: usize = 2048;

const HEAD: &str = "<!DOCTYPE html>\n\
<html><head><title>LED Display Control</title>\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<style>body{font-family:Arial;margin:20px;}\n\
.btn{padding:10px;margin:5px;}</style></head>\n\
<body>\n\
<h1>LED Display Control</h1>\n";

/// Render the status page. On overflow the buffer holds a truncated
/// page and `Err` is returned; the caller may still send what fits.
pub fn render(config: &Config, now: LocalTime, out: &mut String<PAGE_BUF>) -> fmt::Result {
    out.push_str(HEAD).map_err(|_| fmt::Error)?;
    write!(out, "<p>Current Time: {now}</p>\n")?;

    write!(
        out,
        "<form action=\"/update\" method=\"get\">\n\
         Start Hour (0-23): <input type=\"number\" name=\"start\" value=\"{}\" min=\"0\" max=\"23\"><br>\n\
         End Hour (0-23): <input type=\"number\" name=\"end\" value=\"{}\" min=\"0\" max=\"23\"><br>\n\
         Timezone (UTC): <select name=\"tz\">\n",
        config.start_hour, config.end_hour
    )?;
    for tz in TIMEZONE_MIN..=TIMEZONE_MAX {
        let selected = if tz == config.timezone { " selected" } else { "" };
        write!(out, "<option value=\"{tz}\"{selected}>UTC{tz:+}</option>\n")?;
    }
    write!(
        out,
        "</select><br>\n\
         <input type=\"submit\" value=\"Update Settings\" class=\"btn\">\n\
         </form>\n\
         <a href=\"/on\"><button class=\"btn\">Turn On</button></a>\n\
         <a href=\"/off\"><button class=\"btn\">Turn Off</button></a>\n\
         <p>Current Status: {}</p>\n\
         </body></html>\n",
        if config.enabled { "On" } else { "Off" }
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{parse, Request};

    fn page(config: &Config, now: LocalTime) -> String<PAGE_BUF> {
        let mut out = String::new();
        render(config, now, &mut out).unwrap();
        out
    }

    #[test]
    fn reflects_time_and_status() {
        let config = Config::default();
        let html = page(&config, LocalTime { hour: 9, minute: 5, second: 0 });
        assert!(html.contains("Current Time: 09:05:00"));
        assert!(html.contains("Current Status: On"));
        assert!(html.ends_with("</body></html>\n"));
    }

    #[test]
    fn enumerates_every_utc_offset_once() {
        let html = page(&Config::default(), LocalTime { hour: 0, minute: 0, second: 0 });
        for tz in -12i8..=14 {
            let mut needle = String::<32>::new();
            write!(needle, "<option value=\"{tz}\"").unwrap();
            assert!(html.contains(needle.as_str()), "missing offset {tz}");
        }
        assert_eq!(html.matches(" selected").count(), 1);
        // Default timezone is -5.
        assert!(html.contains("<option value=\"-5\" selected>UTC-5</option>"));
    }

    #[test]
    fn update_round_trips_into_the_form() {
        let mut config = Config::default();
        let Request::Update(p) = parse("GET /update?start=21&end=5&tz=2 HTTP/1.1") else {
            panic!("not an update");
        };
        Request::Update(p).apply(&mut config);

        let html = page(&config, LocalTime { hour: 12, minute: 0, second: 0 });
        assert!(html.contains("name=\"start\" value=\"21\""));
        assert!(html.contains("name=\"end\" value=\"5\""));
        assert!(html.contains("<option value=\"2\" selected>UTC+2</option>"));
    }

    #[test]
    fn disabled_status_renders_off() {
        let mut config = Config::default();
        Request::Off.apply(&mut config);
        let html = page(&config, LocalTime { hour: 1, minute: 2, second: 3 });
        assert!(html.contains("Current Status: Off"));
    }
}
