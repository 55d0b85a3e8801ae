// Dashboard handlers (d100-d102)
pub mod d100_disbursal_summary;
pub mod d101_collection_summary;
pub mod d102_aum_report;
