//! Message body rendering.

/// Render the outbound text for an order notification.
///
/// The wording is a presentation detail; what matters is that both the
/// recipient's name and the order content appear, separated by a line
/// break, so the delivered text is self-contained.
#[must_use]
pub fn render_message(name: &str, order: &str) -> String {
    format!("Hello {name}, we have received your order:\n{order}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_both_fields() {
        let body = render_message("Ana", "2 pizzas");
        assert!(body.contains("Ana"));
        assert!(body.contains("2 pizzas"));
    }

    #[test]
    fn test_render_separates_with_line_break() {
        let body = render_message("Ana", "2 pizzas");
        let (greeting, order) = body.split_once('\n').unwrap();
        assert!(greeting.contains("Ana"));
        assert_eq!(order, "2 pizzas");
    }
}
