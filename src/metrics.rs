use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::{EnrichedEntry, Unit, WorkoutEntry};
use crate::normalize::fold_text;

/// Calorie estimate constants. The strength formula is a volume-load proxy,
/// not a physiological model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieModel {
    pub cardio_per_minute: f64,
    pub strength_factor: f64,
    pub default_sets: u32,
    pub default_reps: u32,
}

impl Default for CalorieModel {
    fn default() -> Self {
        Self {
            cardio_per_minute: 7.0,
            strength_factor: 0.005,
            default_sets: 3,
            default_reps: 10,
        }
    }
}

impl CalorieModel {
    pub fn estimate(&self, entry: &WorkoutEntry, is_cardio: bool) -> f64 {
        if is_cardio {
            return entry.load * self.cardio_per_minute;
        }
        let reps = entry.reps.unwrap_or(self.default_reps);
        let sets = entry.sets.unwrap_or(self.default_sets);
        entry.load * f64::from(reps) * f64::from(sets) * self.strength_factor
    }
}

#[derive(Debug, Clone)]
pub struct CardioClassifier {
    keywords: Vec<String>,
}

impl CardioClassifier {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|keyword| fold_text(keyword.trim()))
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    pub fn is_cardio(&self, exercise_name: &str) -> bool {
        let name = fold_text(exercise_name);
        self.keywords.iter().any(|keyword| name.contains(keyword.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct Enricher {
    classifier: CardioClassifier,
    calories: CalorieModel,
    weekday_labels: [String; 7],
}

impl Enricher {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            classifier: CardioClassifier::new(&config.cardio_keywords),
            calories: config.calories,
            weekday_labels: config.weekday_labels.clone(),
        }
    }

    pub fn enrich_one(&self, entry: WorkoutEntry) -> EnrichedEntry {
        let is_cardio = self.classifier.is_cardio(&entry.exercise_name);
        let estimated_calories = self.calories.estimate(&entry, is_cardio);
        let weekday = entry
            .date
            .as_date()
            .map(|date| weekday_label(&self.weekday_labels, date.weekday()).to_string());
        EnrichedEntry {
            entry,
            is_cardio,
            unit: if is_cardio { Unit::Min } else { Unit::Kg },
            estimated_calories,
            weekday,
        }
    }

    pub fn enrich(&self, entries: Vec<WorkoutEntry>) -> Vec<EnrichedEntry> {
        let mut enriched: Vec<EnrichedEntry> =
            entries.into_iter().map(|entry| self.enrich_one(entry)).collect();
        sort_by_date(&mut enriched);
        enriched
    }
}

pub fn sort_by_date(entries: &mut [EnrichedEntry]) {
    entries.sort_by_key(|entry| match entry.date() {
        Some(date) => (false, date),
        None => (true, NaiveDate::MIN),
    });
}

pub fn weekday_label(labels: &[String; 7], weekday: Weekday) -> &str {
    &labels[weekday.num_days_from_monday() as usize]
}

pub fn exercise_key(name: &str) -> String {
    fold_text(name).split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadPoint {
    pub date: NaiveDate,
    pub load: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSummary {
    pub exercise: String,
    pub is_cardio: bool,
    pub unit: Unit,
    pub last: f64,
    pub record: f64,
    pub sessions: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub history: Vec<LoadPoint>,
}

/// Expects `entries` in the order produced by [`Enricher::enrich`]. `last` is
/// taken from the latest dated session; an exercise with no dated session
/// falls back to its last row.
pub fn exercise_summaries(entries: &[EnrichedEntry]) -> Vec<ExerciseSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<ExerciseSummary> = Vec::new();

    for item in entries {
        let key = exercise_key(&item.entry.exercise_name);
        let slot = *index.entry(key).or_insert_with(|| {
            summaries.push(ExerciseSummary {
                exercise: item.entry.exercise_name.clone(),
                is_cardio: item.is_cardio,
                unit: item.unit,
                last: item.load(),
                record: item.load(),
                sessions: 0,
                first_date: None,
                last_date: None,
                history: Vec::new(),
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];
        summary.sessions += 1;
        summary.record = summary.record.max(item.load());
        match item.date() {
            Some(date) => {
                summary.first_date.get_or_insert(date);
                summary.last_date = Some(date);
                summary.last = item.load();
                summary.history.push(LoadPoint {
                    date,
                    load: item.load(),
                });
            }
            None if summary.last_date.is_none() => summary.last = item.load(),
            None => {}
        }
    }
    summaries
}

pub fn find_exercise<'a>(summaries: &'a [ExerciseSummary], name: &str) -> Option<&'a ExerciseSummary> {
    let key = exercise_key(name);
    summaries
        .iter()
        .find(|summary| exercise_key(&summary.exercise) == key)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub entries: usize,
    pub calories: f64,
    pub load: f64,
}

impl Totals {
    fn add(&mut self, entry: &EnrichedEntry) {
        self.entries += 1;
        self.calories += entry.estimated_calories;
        self.load += entry.load();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayTotals {
    pub weekday: Weekday,
    pub label: String,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekTotals {
    pub iso_year: i32,
    pub iso_week: u32,
    pub start: NaiveDate,
    #[serde(flatten)]
    pub totals: Totals,
}

pub fn daily_totals(entries: &[EnrichedEntry]) -> Vec<DayTotals> {
    let mut days: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for entry in entries {
        if let Some(date) = entry.date() {
            days.entry(date).or_default().add(entry);
        }
    }
    days.into_iter()
        .map(|(date, totals)| DayTotals { date, totals })
        .collect()
}

pub fn today_totals(entries: &[EnrichedEntry], today: NaiveDate) -> DayTotals {
    let mut totals = Totals::default();
    for entry in entries.iter().filter(|entry| entry.date() == Some(today)) {
        totals.add(entry);
    }
    DayTotals { date: today, totals }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_totals(entries: &[EnrichedEntry], labels: &[String; 7]) -> Vec<WeekdayTotals> {
    let mut buckets: Vec<WeekdayTotals> = WEEK
        .into_iter()
        .map(|weekday| {
            WeekdayTotals {
                weekday,
                label: weekday_label(labels, weekday).to_string(),
                totals: Totals::default(),
            }
        })
        .collect();
    for entry in entries {
        if let Some(date) = entry.date() {
            buckets[date.weekday().num_days_from_monday() as usize]
                .totals
                .add(entry);
        }
    }
    buckets
}

pub fn weekly_totals(entries: &[EnrichedEntry]) -> Vec<WeekTotals> {
    let mut weeks: BTreeMap<(i32, u32), (NaiveDate, Totals)> = BTreeMap::new();
    for entry in entries {
        let Some(date) = entry.date() else {
            continue;
        };
        let week = date.iso_week();
        let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
        weeks
            .entry((week.year(), week.week()))
            .or_insert((start, Totals::default()))
            .1
            .add(entry);
    }
    weeks
        .into_iter()
        .map(|((iso_year, iso_week), (start, totals))| WeekTotals {
            iso_year,
            iso_week,
            start,
            totals,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current: u32,
    pub latest: u32,
    pub longest: u32,
    pub last_active: Option<NaiveDate>,
}

pub fn streaks(entries: &[EnrichedEntry], today: NaiveDate) -> StreakSummary {
    let days: BTreeSet<NaiveDate> = entries
        .iter()
        .filter_map(EnrichedEntry::date)
        .filter(|date| *date <= today)
        .collect();

    let run_ending = |end: NaiveDate| -> u32 {
        let mut count = 0;
        let mut cursor = Some(end);
        while let Some(day) = cursor.filter(|day| days.contains(day)) {
            count += 1;
            cursor = day.pred_opt();
        }
        count
    };

    let last_active = days.last().copied();
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in &days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    StreakSummary {
        current: run_ending(today),
        latest: last_active.map(run_ending).unwrap_or(0),
        longest,
        last_active,
    }
}
