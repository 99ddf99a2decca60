//! Classification metrics.
//!
//! Computes a multi-class confusion matrix from predicted and ground-truth
//! class indices and derives per-class and macro-averaged scores from it.

use std::fmt;

/// Scores for one class, treating it as positive and every other class as negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Multi-class evaluation summary.
#[derive(Debug, Clone)]
pub struct ClassificationMetrics {
    /// `confusion[actual][predicted]`.
    pub confusion: Vec<Vec<usize>>,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    /// Unweighted mean of per-class F1.
    pub macro_f1: f64,
}

/// Compute metrics over `num_classes` classes.
///
/// Indices outside `0..num_classes` are ignored. Classes that appear neither in
/// the predictions nor in the labels are left out of the macro average.
pub fn compute_metrics(
    predictions: &[usize],
    labels: &[usize],
    num_classes: usize,
) -> ClassificationMetrics {
    assert_eq!(
        predictions.len(),
        labels.len(),
        "predictions and labels must have same length"
    );

    let mut confusion = vec![vec![0usize; num_classes]; num_classes];
    let mut correct = 0usize;
    let mut total = 0usize;
    for (&pred, &label) in predictions.iter().zip(labels) {
        if pred >= num_classes || label >= num_classes {
            continue;
        }
        confusion[label][pred] += 1;
        total += 1;
        if pred == label {
            correct += 1;
        }
    }

    let mut per_class = Vec::with_capacity(num_classes);
    let mut f1_sum = 0.0;
    let mut present = 0usize;
    for c in 0..num_classes {
        let tp = confusion[c][c];
        let support: usize = confusion[c].iter().sum();
        let predicted: usize = confusion.iter().map(|row| row[c]).sum();

        let precision = if predicted > 0 {
            tp as f64 / predicted as f64
        } else {
            0.0
        };
        let recall = if support > 0 {
            tp as f64 / support as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        if support > 0 || predicted > 0 {
            f1_sum += f1;
            present += 1;
        }
        per_class.push(ClassMetrics {
            precision,
            recall,
            f1,
            support,
        });
    }

    let accuracy = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };
    let macro_f1 = if present > 0 {
        f1_sum / present as f64
    } else {
        0.0
    };

    ClassificationMetrics {
        confusion,
        per_class,
        accuracy,
        macro_f1,
    }
}

/// Macro-averaged F1, the score recorded for every run.
pub fn macro_f1(predictions: &[usize], labels: &[usize], num_classes: usize) -> f64 {
    compute_metrics(predictions, labels, num_classes).macro_f1
}

impl fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "acc={:.4} macro_f1={:.4} classes={}",
            self.accuracy,
            self.macro_f1,
            self.per_class.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let m = compute_metrics(&[0, 1, 2, 2], &[0, 1, 2, 2], 3);
        assert!((m.accuracy - 1.0).abs() < 1e-9);
        assert!((m.macro_f1 - 1.0).abs() < 1e-9);
        assert_eq!(m.per_class[2].support, 2);
    }

    #[test]
    fn test_all_wrong() {
        let m = compute_metrics(&[1, 1, 0, 0], &[0, 0, 1, 1], 2);
        assert!(m.accuracy.abs() < 1e-9);
        assert!(m.macro_f1.abs() < 1e-9);
        assert_eq!(m.confusion[0][1], 2);
        assert_eq!(m.confusion[1][0], 2);
    }

    #[test]
    fn test_mixed_macro_average() {
        // class 0: tp=2 fp=1 fn=0 -> p=2/3 r=1 f1=0.8
        // class 1: tp=1 fp=0 fn=1 -> p=1 r=1/2 f1=2/3
        let preds = vec![0, 0, 1, 0];
        let labels = vec![0, 0, 1, 1];
        let m = compute_metrics(&preds, &labels, 2);
        assert!((m.per_class[0].f1 - 0.8).abs() < 1e-9);
        assert!((m.per_class[1].f1 - 2.0 / 3.0).abs() < 1e-9);
        assert!((m.macro_f1 - (0.8 + 2.0 / 3.0) / 2.0).abs() < 1e-9);
        assert!((m.accuracy - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_absent_class_not_averaged() {
        let m = compute_metrics(&[0, 1], &[0, 1], 3);
        assert!((m.macro_f1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty() {
        let m = compute_metrics(&[], &[], 2);
        assert!(m.accuracy.abs() < 1e-9);
        assert!(m.macro_f1.abs() < 1e-9);
    }
}
