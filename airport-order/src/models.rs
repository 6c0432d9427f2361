use airport_shared::{Id, NewTicket};
use serde::Deserialize;

/// Body of an order submission: one entry per seat.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub tickets: Vec<NewTicket>,
}

/// Body of a standalone ticket submission into an existing order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    pub row: i32,
    pub seat: i32,
    pub flight: Id,
    pub order: Id,
}

impl CreateTicketRequest {
    pub fn seat(&self) -> NewTicket {
        NewTicket {
            row: self.row,
            seat: self.seat,
            flight: self.flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_deserialization() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"tickets": [{"row": 9, "seat": 9, "flight": 3}, {"row": 1, "seat": 2, "flight": 3}]}"#,
        )
        .expect("Failed to deserialize");
        assert_eq!(req.tickets.len(), 2);
        assert_eq!(req.tickets[0], NewTicket { row: 9, seat: 9, flight: 3 });
    }
}
