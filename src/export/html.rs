//! HTML table fragment serializer

use crate::value::Value;

/// HTML exporter
pub struct HtmlExporter;

impl HtmlExporter {
	/// Render a `<table>` fragment; every cell is text-coerced and
	/// HTML-escaped.
	///
	/// # Examples
	///
	/// ```
	/// use export_action::export::html::HtmlExporter;
	/// use export_action::value::Value;
	///
	/// let header = vec!["title".to_string()];
	/// let rows = vec![vec![Value::text("A & B")]];
	/// let html = HtmlExporter::export(Some(&header), &rows);
	/// assert!(html.contains("<th>title</th>"));
	/// assert!(html.contains("<td>A &amp; B</td>"));
	/// ```
	pub fn export(header: Option<&[String]>, rows: &[Vec<Value>]) -> String {
		let mut out = String::from("<table>\n");
		if let Some(header) = header {
			out.push_str("<thead><tr>");
			for cell in header {
				out.push_str("<th>");
				out.push_str(&escape(cell));
				out.push_str("</th>");
			}
			out.push_str("</tr></thead>\n");
		}
		out.push_str("<tbody>\n");
		for row in rows {
			out.push_str("<tr>");
			for cell in row {
				out.push_str("<td>");
				out.push_str(&escape(&cell.to_text()));
				out.push_str("</td>");
			}
			out.push_str("</tr>\n");
		}
		out.push_str("</tbody>\n</table>\n");
		out
	}
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			_ => out.push(c),
		}
	}
	out
}
