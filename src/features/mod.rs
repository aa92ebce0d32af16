// Ticket behaviour shared by the commands and the interaction handler
pub mod components;
pub mod cooldown;
pub mod interactions;
pub mod notifications;
pub mod role_form;
pub mod ticket_flow;
pub mod tickets;
