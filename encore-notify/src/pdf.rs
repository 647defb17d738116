use crate::NotifyError;
use encore_booking::TicketDetails;
use printpdf::{BuiltinFont, Mm, PdfDocument};

/// Renders a ticket into an opaque binary document. The dispatcher does not
/// interpret the output, it only attaches it.
pub trait TicketRenderer: Send + Sync {
    fn render(&self, ticket: &TicketDetails) -> Result<Vec<u8>, NotifyError>;
}

/// A4 e-ticket with the festival header and the booking details block.
pub struct PdfTicketRenderer;

impl TicketRenderer for PdfTicketRenderer {
    fn render(&self, ticket: &TicketDetails) -> Result<Vec<u8>, NotifyError> {
        let (doc, page, layer) = PdfDocument::new(
            format!("Ticket - {}", ticket.event_title),
            Mm(210.0),
            Mm(297.0),
            "ticket",
        );
        let layer = doc.get_page(page).get_layer(layer);

        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| NotifyError::Render(e.to_string()))?;
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| NotifyError::Render(e.to_string()))?;

        layer.use_text("ACTING EUROPE", 25.0, Mm(62.0), Mm(270.0), &bold);
        layer.use_text("Theatre Without Borders", 14.0, Mm(72.0), Mm(260.0), &regular);
        layer.use_text("E-TICKET", 20.0, Mm(83.0), Mm(245.0), &bold);

        let seats = ticket
            .seats
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let lines = [
            format!("Event: {}", ticket.event_title),
            format!("Date: {}", ticket.event_date),
            format!("Time: {}", ticket.event_time),
            format!("Venue: {}", ticket.venue_name),
            format!("Seat(s): {}", seats),
            format!("Booking Reference: {}", ticket.booking_reference),
            format!("Customer: {}", ticket.customer_name),
        ];
        let mut y = 225.0;
        for line in &lines {
            layer.use_text(line.as_str(), 12.0, Mm(25.0), Mm(y), &regular);
            y -= 10.0;
        }

        layer.use_text(
            "Please present this ticket (printed or on your mobile device) at the venue entrance.",
            9.0,
            Mm(25.0),
            Mm(135.0),
            &regular,
        );
        layer.use_text(
            "For assistance, contact: tickets@actingeurope.com",
            9.0,
            Mm(25.0),
            Mm(129.0),
            &regular,
        );

        doc.save_to_bytes()
            .map_err(|e| NotifyError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use encore_shared::SeatId;
    use uuid::Uuid;

    #[test]
    fn test_renders_nonempty_pdf() {
        let ticket = TicketDetails {
            booking_id: Uuid::new_v4(),
            booking_reference: "AE-123456-042".into(),
            event_title: "Hamlet".into(),
            event_date: "2025-06-14".into(),
            event_time: "19:30".into(),
            venue_name: "Chamber Stage".into(),
            seats: vec![SeatId::new(3, 1), SeatId::new(3, 2)],
            customer_name: "Ana Ivanova".into(),
            customer_email: "ana@example.com".into(),
            starts_at: Utc::now(),
        };
        let bytes = PdfTicketRenderer.render(&ticket).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
