pub mod match_id;
