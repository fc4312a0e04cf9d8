//! Demo candidates for sortbench.
//!
//! Run with `cargo run --release --example sorting -- --sizes 5,7,9,12,100,1000 -n 20 --timeout 2s`.
//! The quadratic and worse entries are expected to be skipped as sizes grow.

use rand::seq::SliceRandom;
use sortbench::prelude::*;

#[candidate(name = "Std Sort")]
fn std_sort(mut v: Vec<i64>) -> Vec<i64> {
    v.sort();
    v
}

#[candidate(name = "Std Unstable Sort")]
fn std_unstable_sort(mut v: Vec<i64>) -> Vec<i64> {
    v.sort_unstable();
    v
}

#[candidate(name = "Insertion Sort")]
fn insertion_sort(mut v: Vec<i64>) -> Vec<i64> {
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && v[j - 1] > v[j] {
            v.swap(j - 1, j);
            j -= 1;
        }
    }
    v
}

#[candidate(name = "Bubble Sort")]
fn bubble_sort(mut v: Vec<i64>) -> Vec<i64> {
    let mut end = v.len();
    while end > 1 {
        let mut last_swap = 0;
        for i in 1..end {
            if v[i - 1] > v[i] {
                v.swap(i - 1, i);
                last_swap = i;
            }
        }
        end = last_swap;
    }
    v
}

#[candidate(name = "Cocktail Shaker Sort")]
fn cocktail_sort(mut v: Vec<i64>) -> Vec<i64> {
    if v.len() < 2 {
        return v;
    }
    let (mut lo, mut hi) = (0, v.len() - 1);
    while lo < hi {
        let mut new_hi = lo;
        for i in lo..hi {
            if v[i] > v[i + 1] {
                v.swap(i, i + 1);
                new_hi = i;
            }
        }
        hi = new_hi;
        let mut new_lo = hi;
        for i in (lo..hi).rev() {
            if v[i] > v[i + 1] {
                v.swap(i, i + 1);
                new_lo = i + 1;
            }
        }
        lo = new_lo;
    }
    v
}

#[candidate(name = "Selection Sort")]
fn selection_sort(mut v: Vec<i64>) -> Vec<i64> {
    for i in 0..v.len() {
        let min = (i..v.len()).min_by_key(|&j| v[j]).unwrap_or(i);
        v.swap(i, min);
    }
    v
}

#[candidate(name = "Gnome Sort")]
fn gnome_sort(mut v: Vec<i64>) -> Vec<i64> {
    let mut i = 1;
    while i < v.len() {
        if i == 0 || v[i - 1] <= v[i] {
            i += 1;
        } else {
            v.swap(i - 1, i);
            i -= 1;
        }
    }
    v
}

#[candidate(name = "Shell Sort")]
fn shell_sort(mut v: Vec<i64>) -> Vec<i64> {
    // Ciura gaps, extended by ×2.25
    let mut gaps = vec![1usize, 4, 10, 23, 57, 132, 301, 701];
    while let Some(&last) = gaps.last() {
        let next = (last as f64 * 2.25) as usize;
        if next >= v.len() {
            break;
        }
        gaps.push(next);
    }
    for &gap in gaps.iter().rev() {
        for i in gap..v.len() {
            let value = v[i];
            let mut j = i;
            while j >= gap && v[j - gap] > value {
                v[j] = v[j - gap];
                j -= gap;
            }
            v[j] = value;
        }
    }
    v
}

#[candidate(name = "Comb Sort")]
fn comb_sort(mut v: Vec<i64>) -> Vec<i64> {
    let mut gap = v.len();
    let mut sorted = false;
    while !sorted {
        gap = ((gap as f64 / 1.3) as usize).max(1);
        sorted = gap == 1;
        for i in 0..v.len().saturating_sub(gap) {
            if v[i] > v[i + gap] {
                v.swap(i, i + gap);
                sorted = false;
            }
        }
    }
    v
}

#[candidate(name = "Merge Sort")]
fn merge_sort(v: Vec<i64>) -> Vec<i64> {
    if v.len() <= 1 {
        return v;
    }
    let mut left = v;
    let right = left.split_off(left.len() / 2);
    let (left, right) = (merge_sort(left), merge_sort(right));

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if left[i] <= right[j] {
            merged.push(left[i]);
            i += 1;
        } else {
            merged.push(right[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}

#[candidate(name = "Quick Sort")]
fn quick_sort(mut v: Vec<i64>) -> Vec<i64> {
    fn sort(v: &mut [i64]) {
        if v.len() <= 1 {
            return;
        }
        // Median of three
        let mid = v.len() / 2;
        let last = v.len() - 1;
        if v[mid] < v[0] {
            v.swap(mid, 0);
        }
        if v[last] < v[0] {
            v.swap(last, 0);
        }
        if v[last] < v[mid] {
            v.swap(last, mid);
        }
        v.swap(mid, last);

        let pivot = v[last];
        let mut store = 0;
        for i in 0..last {
            if v[i] < pivot {
                v.swap(i, store);
                store += 1;
            }
        }
        v.swap(store, last);

        let (left, right) = v.split_at_mut(store);
        sort(left);
        sort(&mut right[1..]);
    }
    sort(&mut v);
    v
}

#[candidate(name = "Heap Sort")]
fn heap_sort(mut v: Vec<i64>) -> Vec<i64> {
    fn sift_down(v: &mut [i64], mut root: usize, end: usize) {
        loop {
            let mut child = 2 * root + 1;
            if child >= end {
                break;
            }
            if child + 1 < end && v[child] < v[child + 1] {
                child += 1;
            }
            if v[root] >= v[child] {
                break;
            }
            v.swap(root, child);
            root = child;
        }
    }

    let n = v.len();
    for root in (0..n / 2).rev() {
        sift_down(&mut v, root, n);
    }
    for end in (1..n).rev() {
        v.swap(0, end);
        sift_down(&mut v, 0, end);
    }
    v
}

#[candidate(name = "Counting Sort")]
fn counting_sort(v: Vec<i64>) -> Vec<i64> {
    let (Some(&min), Some(&max)) = (v.iter().min(), v.iter().max()) else {
        return v;
    };
    let mut counts = vec![0usize; (max - min) as usize + 1];
    for &x in &v {
        counts[(x - min) as usize] += 1;
    }
    let mut out = Vec::with_capacity(v.len());
    for (offset, &count) in counts.iter().enumerate() {
        out.extend(std::iter::repeat_n(min + offset as i64, count));
    }
    out
}

#[candidate(name = "LSD Radix Sort")]
fn lsd_radix_sort(v: Vec<i64>) -> Vec<i64> {
    // Flipping the sign bit makes unsigned byte order match signed order
    let mut keys: Vec<u64> = v.iter().map(|&x| (x as u64) ^ (1 << 63)).collect();
    let mut buffer = vec![0u64; keys.len()];
    for shift in (0..64).step_by(8) {
        let mut counts = [0usize; 257];
        for &k in &keys {
            counts[((k >> shift) & 0xFF) as usize + 1] += 1;
        }
        for i in 1..257 {
            counts[i] += counts[i - 1];
        }
        for &k in &keys {
            let bucket = ((k >> shift) & 0xFF) as usize;
            buffer[counts[bucket]] = k;
            counts[bucket] += 1;
        }
        std::mem::swap(&mut keys, &mut buffer);
    }
    keys.into_iter().map(|k| (k ^ (1 << 63)) as i64).collect()
}

#[candidate(name = "Stooge Sort")]
fn stooge_sort(mut v: Vec<i64>) -> Vec<i64> {
    fn sort(v: &mut [i64]) {
        let n = v.len();
        if n < 2 {
            return;
        }
        if v[0] > v[n - 1] {
            v.swap(0, n - 1);
        }
        if n > 2 {
            let third = n / 3;
            sort(&mut v[..n - third]);
            sort(&mut v[third..]);
            sort(&mut v[..n - third]);
        }
    }
    sort(&mut v);
    v
}

#[candidate(name = "Slowsort")]
fn slowsort(mut v: Vec<i64>) -> Vec<i64> {
    fn sort(v: &mut [i64]) {
        let n = v.len();
        if n < 2 {
            return;
        }
        let mid = n / 2;
        sort(&mut v[..mid]);
        sort(&mut v[mid..]);
        if v[n - 1] < v[mid - 1] {
            v.swap(n - 1, mid - 1);
        }
        sort(&mut v[..n - 1]);
    }
    sort(&mut v);
    v
}

#[candidate(name = "Bogo Sort")]
fn bogo_sort(mut v: Vec<i64>) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    while !v.windows(2).all(|w| w[0] <= w[1]) {
        v.shuffle(&mut rng);
    }
    v
}

fn main() -> anyhow::Result<()> {
    sortbench::run()
}
