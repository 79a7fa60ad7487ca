pub mod campaigns;
pub mod leads;
pub mod list;
pub mod sales;
