use crate::models::disk::DiskRecord;
use crate::util::human::fmt_pct;

/// Build the index page around one table row per record. Rows keep
/// collection order; the client-side script handles sorting.
pub fn index_page(records: &[DiskRecord]) -> String {
    let mut rows = String::new();
    for r in records {
        rows.push_str(&format!(
            concat!(
                "      <tr>\n",
                "        <td>{device}</td>\n",
                "        <td>{mount}</td>\n",
                "        <td>{fstype}</td>\n",
                "        <td data-sort=\"{size}\">{human_size}</td>\n",
                "        <td data-sort=\"{used}\">{human_used}</td>\n",
                "        <td data-sort=\"{free}\">{human_free}</td>\n",
                "        <td data-sort=\"{used_pct}\"><div class=\"bar\"><div class=\"fill\" style=\"width:{used_pct:.1}%\"></div></div>{used_pct_str}</td>\n",
                "        <td data-sort=\"{free_pct}\">{free_pct_str}</td>\n",
                "      </tr>\n",
            ),
            device = escape(&r.device),
            mount = escape(&r.mount_point),
            fstype = escape(&r.fs_type),
            size = r.size_bytes,
            used = r.used_bytes,
            free = r.free_bytes,
            human_size = escape(&r.human_size),
            human_used = escape(&r.human_used),
            human_free = escape(&r.human_free),
            used_pct = r.used_percent,
            free_pct = r.free_percent,
            used_pct_str = fmt_pct(r.used_percent),
            free_pct_str = fmt_pct(r.free_percent),
        ));
    }

    let body = if records.is_empty() {
        "  <p class=\"empty\">No filesystems to show.</p>\n".to_string()
    } else {
        format!(
            concat!(
                "  <table id=\"disks\">\n",
                "    <thead>\n",
                "      <tr>",
                "<th>Device</th>",
                "<th>Mount</th>",
                "<th>Type</th>",
                "<th>Size</th>",
                "<th>Used</th>",
                "<th>Free</th>",
                "<th>Used %</th>",
                "<th>Free %</th>",
                "</tr>\n",
                "    </thead>\n",
                "    <tbody>\n{rows}    </tbody>\n",
                "  </table>\n",
            ),
            rows = rows,
        )
    };

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <title>diskinfo</title>\n",
            "  <link rel=\"stylesheet\" href=\"/static/style.css\">\n",
            "</head>\n",
            "<body>\n",
            "  <h1>Disk usage</h1>\n",
            "{body}",
            "  <p class=\"footer\">generated {ts}</p>\n",
            "  <script src=\"/static/sort.js\"></script>\n",
            "</body>\n",
            "</html>\n",
        ),
        body = body,
        ts = chrono::Local::now().to_rfc3339(),
    )
}

/// Minimal HTML escaping for text nodes and attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _   => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::DiskRecord;

    #[test]
    fn page_contains_one_row_per_record() {
        let records = vec![
            DiskRecord::new("/dev/sda1", "/", "ext4", 1000, 400, 600),
            DiskRecord::new("/dev/sdb1", "/data", "xfs", 2000, 500, 1500),
        ];
        let page = index_page(&records);
        assert_eq!(page.matches("<tr>\n").count(), 2);
        assert!(page.contains("/dev/sda1"));
        assert!(page.contains("/data"));
        assert!(page.contains("40.0%"));
    }

    #[test]
    fn empty_collection_renders_a_placeholder() {
        let page = index_page(&[]);
        assert!(page.contains("No filesystems to show."));
        assert!(!page.contains("<table"));
    }

    #[test]
    fn device_names_are_html_escaped() {
        let records = vec![DiskRecord::new("<evil>&co", "/", "ext4", 10, 5, 5)];
        let page = index_page(&records);
        assert!(page.contains("&lt;evil&gt;&amp;co"));
        assert!(!page.contains("<evil>"));
    }
}
