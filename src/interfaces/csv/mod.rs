pub mod payout_reader;
pub mod record_writer;
