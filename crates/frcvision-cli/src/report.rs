//! `/report`: an HTML snapshot of the console for sharing outside the
//! terminal.  Every value taken from the service is escaped.

use frcvision_console::{BadgeStyle, Console, escape_html};

use crate::view::TerminalView;

pub fn html_report(console: &Console<TerminalView>) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>FRCVision status</title></head>\n<body>\n<h1>FRCVision status</h1>\n",
    );
    out.push_str(&format!(
        "<p>connection: {}</p>\n",
        escape_html(&console.state().to_string())
    ));

    let badge = console.badge();
    let class = match badge.style {
        BadgeStyle::Enabled => "badge-primary",
        BadgeStyle::Disabled => "badge-secondary",
        BadgeStyle::Unknown => "badge-dark",
    };
    out.push_str(&format!(
        "<p>vision service: <span class=\"badge {class}\">{}</span></p>\n",
        escape_html(&badge.text)
    ));

    out.push_str("<h2>System</h2>\n<table>\n");
    for (name, value) in console.system_status().iter() {
        out.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            escape_html(name),
            escape_html(value)
        ));
    }
    out.push_str("</table>\n");

    out.push_str(
        "<h2>Streams</h2>\n<table>\n<tr><th>source</th><th>client</th><th>port</th><th>fps</th><th>Mbps</th></tr>\n",
    );
    for row in console.streams() {
        out.push_str(&row.to_html());
        out.push('\n');
    }
    out.push_str("</table>\n");

    out.push_str("<h2>Notifications</h2>\n");
    for note in console.view().notifications() {
        out.push_str(&note.to_html());
        out.push('\n');
    }
    out.push_str("</body></html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use frcvision_console::{Notification, ViewRenderer};
    use frcvision_middleware::Endpoint;
    use frcvision_types::{ConnectionState, InboundMessage, StreamStats};
    use serde_json::json;

    #[test]
    fn report_escapes_service_text() {
        let view = TerminalView::new(Endpoint::new("frcvision.local", None, false));
        let mut console = Console::new(view);
        console.on_connection(ConnectionState::Open);
        console.handle(InboundMessage::ServerStreams {
            streams: vec![StreamStats {
                source_id: json!("<script>x</script>"),
                remote_ip: "10.2.94.5".into(),
                remote_port: 5800,
                actual_fps: 30.0,
                actual_data_rate: 1_000_000.0,
            }],
        });
        console.handle(InboundMessage::Status {
            message: "<b>saved</b>".into(),
        });
        console
            .view_mut()
            .notify(&Notification::success("report ready"));

        let html = html_report(&console);
        assert!(html.contains("connection: Connected"));
        assert!(html.contains("&lt;script&gt;x&lt;&#x2F;script&gt;"));
        assert!(html.contains("&lt;b&gt;saved&lt;&#x2F;b&gt;"));
        assert!(html.contains("alert-success"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
    }
}
