/// UI layer: egui panels and the central table view.
///
/// `panels` draws the top bar and the filter sidebar; `table` draws the
/// KPI strip, the price rankings, and the filtered material table.
pub mod panels;
pub mod table;
