/*!

# Quick start with Google Forms

This example runs a small culture survey end to end, using an online tool
to collect the answers. It uses Google Forms because it is free and widely
available; Microsoft Forms and similar services export the same kind of
spreadsheet and work the same way.

**Designing the questionnaire** Create a new form and add a **Multiple
choice grid** question. The rows are your statements (one per catalog
entry), the columns are the five agreement labels, from `Strongly disagree`
to `Strongly agree`. Enable "Require a response in each row" so that
submissions arrive complete.

Keep the row wording identical to the `text` column of your question
catalog: this is how the columns of the export are matched back to the
catalog. A catalog for a three-statement survey looks like this:

```text
code,axis,text
q1,Audacity,New ideas are welcome here
q2,Audacity,We experiment without fear of failure
q3,Trust,Mistakes are discussed openly
```

**Collecting the answers** Share the form. Once the campaign is over, open
the `Responses` tab, create the linked spreadsheet and download it in the
**Excel format** (.xlsx).

**Tabulating** Run `cindex` against the export and the catalog:

```bash
cindex --catalog catalog.csv --input responses.xlsx --input-type forms
```

The summary is printed to the standard output:

```text
stats:{
  "cohort": { ... },
  "config": {
    ...
    "survey": "responses.xlsx"
  },
  "results": [
    {
      "axes": { "Audacity": 3.0, "Trust": 5.0 },
      "globalIndex": 80.0,
      "maturity": "Advanced",
      "respondent": "responses.xlsx-00000002",
      "scores": { "q1": 4, "q2": 2, "q3": 5 },
      ...
    }
  ]
}
```

Each respondent gets one entry with the per-question scores, the mean of
each thematic axis, the 0-100 global index and the maturity tier, plus a
`cohort` block averaging the whole campaign.

If your form uses translated labels, pass them in ascending order of
agreement:

```bash
cindex --catalog catalog.csv --input responses.xlsx --input-type forms \
    --labels "Pas du tout d'accord" --labels "Pas d'accord" --labels "Neutre" \
    --labels "D'accord" --labels "Tout à fait d'accord"
```

For recurring campaigns, move these options into a configuration file and
run `cindex --config survey.json` instead. The configuration format and
the other input formats are described in the [manual](crate::manual).

*/
