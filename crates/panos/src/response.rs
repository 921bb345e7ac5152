//! XML API response envelope handling.
//!
//! Every API call answers with `<response status="success|error" code="N">`.
//! Errors carry their text either as `<msg><line>..</line></msg>`,
//! `<result><msg>..</msg></result>` or a bare `<msg>`.

use crate::error::{Error, Result};
use crate::xml::XmlNode;

/// Parse a response body, turning `status="error"` into [`Error::Api`].
pub fn parse_response(body: &str) -> Result<XmlNode> {
    let root = XmlNode::parse(body)?;
    if root.name != "response" {
        return Err(Error::UnexpectedResponse(format!(
            "expected <response>, got <{}>",
            root.name
        )));
    }

    match root.attr("status") {
        Some("success") => Ok(root),
        Some("error") => Err(Error::Api {
            code: root.attr("code").map(str::to_string),
            message: response_message(&root).unwrap_or_else(|| "unknown error".to_string()),
        }),
        other => Err(Error::UnexpectedResponse(format!(
            "unknown response status {:?}",
            other.unwrap_or("")
        ))),
    }
}

/// Collect the human-readable message of a response, if any.
pub fn response_message(root: &XmlNode) -> Option<String> {
    let msg = root
        .child("msg")
        .or_else(|| root.find("result/msg"))?;

    let mut lines = Vec::new();
    collect_lines(msg, &mut lines);
    if lines.is_empty() {
        let text = msg.text.trim();
        if text.is_empty() {
            return None;
        }
        return Some(text.to_string());
    }
    Some(lines.join("; "))
}

fn collect_lines(node: &XmlNode, out: &mut Vec<String>) {
    for child in &node.children {
        if child.name == "line" {
            let text = child.text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
        collect_lines(child, out);
    }
}
