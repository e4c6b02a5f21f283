/// The class labels of the digit classifier, indexed by class position in
/// the model output.
pub(super) const DIGIT_LABELS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
