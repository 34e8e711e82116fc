pub mod channel_reporter;
